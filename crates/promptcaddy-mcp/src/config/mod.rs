//! Configuration loading and resolution.

use std::path::PathBuf;

/// Environment variable naming the prompt directory.
pub const PROMPTS_DIR_ENV: &str = "PROMPTCADDY_DIR";

/// Directory used when nothing else is configured.
pub const DEFAULT_PROMPTS_DIR: &str = "./prompts";

/// Resolve the prompt directory: explicit flag, then environment, then default.
pub fn resolve_prompts_dir(explicit: Option<&str>) -> PathBuf {
    resolve_with(explicit, std::env::var(PROMPTS_DIR_ENV).ok())
}

fn resolve_with(explicit: Option<&str>, env: Option<String>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    match env {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_PROMPTS_DIR),
    }
}
