//! One-shot command-line paths: listing prompts and rendering a single prompt.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use promptcaddy::{Bindings, Prompt, PromptStore, ReloadReport, SELECTION};

const COLUMN_GAP: usize = 2;

/// Load every prompt under `dir` into a fresh store.
pub fn load_store(dir: &Path) -> Result<(PromptStore, ReloadReport)> {
    let store = PromptStore::new(dir);
    let report = store
        .reload()
        .with_context(|| format!("failed to load prompts from {}", dir.display()))?;
    Ok((store, report))
}

/// Render the `ID / VERSION / TITLE` table printed by `list`, sorted by id.
pub fn format_table(prompts: &[Arc<Prompt>]) -> String {
    let mut rows: Vec<[&str; 3]> = vec![["ID", "VERSION", "TITLE"], ["──", "───────", "─────"]];

    let mut sorted: Vec<&Arc<Prompt>> = prompts.iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));
    rows.extend(
        sorted
            .iter()
            .map(|p| [p.id.as_str(), p.version.as_str(), p.title.as_str()]),
    );

    let mut widths = [0usize; 2];
    for row in &rows {
        for (col, width) in widths.iter_mut().enumerate() {
            *width = (*width).max(row[col].chars().count());
        }
    }

    let mut out = String::new();
    for row in &rows {
        for (col, width) in widths.iter().enumerate() {
            let cell = row[col];
            out.push_str(cell);
            let pad = width - cell.chars().count() + COLUMN_GAP;
            out.extend(std::iter::repeat(' ').take(pad));
        }
        out.push_str(row[2]);
        out.push('\n');
    }
    out
}

/// Build bindings for `call` from `--param value` / `--param=value` flags and
/// optional piped input.
///
/// Only declared parameters are accepted as flags. Empty flag values are
/// ignored, as if the flag were not given.
pub fn bind_call_args(
    prompt: &Prompt,
    args: &[String],
    selection: Option<String>,
) -> Result<Bindings> {
    let mut bindings = Bindings::new();

    if let Some(selection) = selection {
        bindings.insert(SELECTION.to_string(), selection);
    }

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let Some(flag) = arg.strip_prefix("--") else {
            bail!("unexpected argument: {arg}");
        };

        let (name, value) = match flag.split_once('=') {
            Some((name, value)) => (name, value.to_string()),
            None => {
                let value = iter
                    .next()
                    .with_context(|| format!("flag needs an argument: --{flag}"))?;
                (flag, value.clone())
            }
        };

        if prompt.parameter(name).is_none() {
            bail!("unknown flag: --{name}");
        }
        if !value.is_empty() {
            bindings.insert(name.to_string(), value);
        }
    }

    Ok(bindings)
}
