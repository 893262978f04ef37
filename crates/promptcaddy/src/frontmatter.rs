//! Front-matter splitting for Markdown prompt files.
//!
//! A prompt file opens with a delimiter line, carries metadata, and closes
//! the block with the same delimiter. Everything after the closing line is
//! the template body, kept byte for byte.
//!
//! | Delimiter | Metadata |
//! |-----------|----------|
//! | `---`     | YAML     |
//! | `+++`     | TOML     |
//! | `;;;`     | JSON     |

use crate::types::{CaddyError, CaddyResult, PromptMeta};

/// Metadata encodings recognized by their block delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Toml,
    Json,
}

impl Format {
    fn from_delimiter(line: &str) -> Option<Self> {
        match line {
            "---" => Some(Format::Yaml),
            "+++" => Some(Format::Toml),
            ";;;" => Some(Format::Json),
            _ => None,
        }
    }

    pub fn delimiter(self) -> &'static str {
        match self {
            Format::Yaml => "---",
            Format::Toml => "+++",
            Format::Json => ";;;",
        }
    }

    fn decode(self, block: &str) -> CaddyResult<PromptMeta> {
        if block.trim().is_empty() {
            return Ok(PromptMeta::default());
        }
        let meta = match self {
            Format::Yaml => serde_yaml::from_str(block)?,
            Format::Toml => toml::from_str(block)?,
            Format::Json => serde_json::from_str(block)?,
        };
        Ok(meta)
    }
}

/// Split a document into its decoded metadata and the remaining body.
///
/// A document without a front-matter block yields default metadata and the
/// whole text as body.
pub fn split(text: &str) -> CaddyResult<(PromptMeta, &str)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let (first, mut rest) = next_line(text);
    let Some(format) = Format::from_delimiter(first) else {
        return Ok((PromptMeta::default(), text));
    };

    let block_start = text.len() - rest.len();
    loop {
        if rest.is_empty() {
            return Err(CaddyError::FrontMatter(
                "unterminated front matter block".to_string(),
            ));
        }

        let line_start = text.len() - rest.len();
        let (line, after) = next_line(rest);
        if line == format.delimiter() {
            let meta = format.decode(&text[block_start..line_start])?;
            return Ok((meta, after));
        }
        rest = after;
    }
}

/// Return the next line without its terminator, and the text after it.
fn next_line(text: &str) -> (&str, &str) {
    match text.find('\n') {
        Some(idx) => {
            let line = &text[..idx];
            (line.strip_suffix('\r').unwrap_or(line), &text[idx + 1..])
        }
        None => (text.strip_suffix('\r').unwrap_or(text), ""),
    }
}
