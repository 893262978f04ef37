//! In-memory prompt store with atomic wholesale reload.
//!
//! Every reload pass builds a complete replacement map before touching the
//! shared one. The write lock is held only for the swap, so readers see
//! either the previous generation or the next one, never a partial map.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use walkdir::WalkDir;

use crate::frontmatter;
use crate::types::{CaddyError, CaddyResult, Prompt, PROMPT_EXTENSION};

type Generation = HashMap<String, Arc<Prompt>>;

/// A prompt file left out of a generation, and why.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of one reload pass.
#[derive(Debug, Clone, Default)]
pub struct ReloadReport {
    /// Number of prompts in the published generation.
    pub loaded: usize,
    pub skipped: Vec<SkippedFile>,
}

/// Owns the current generation of prompts for one source directory.
pub struct PromptStore {
    dir: PathBuf,
    generation: RwLock<Generation>,
    reload_lock: Mutex<()>,
    published: AtomicU64,
}

impl PromptStore {
    /// Create an empty store bound to `dir`. Nothing is read until `reload`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            generation: RwLock::new(HashMap::new()),
            reload_lock: Mutex::new(()),
            published: AtomicU64::new(0),
        }
    }

    /// The bound source directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Rescan the directory and publish a new generation.
    ///
    /// Files that fail to parse, or parse without an id, are skipped with a
    /// warning. Only a failure to enumerate the directory is an error, and
    /// in that case the current generation stays in place.
    pub fn reload(&self) -> CaddyResult<ReloadReport> {
        let _serial = self
            .reload_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let paths = scan(&self.dir)?;
        let mut next = Generation::with_capacity(paths.len());
        let mut report = ReloadReport::default();

        for path in paths {
            match load_prompt(&path) {
                Ok(prompt) if prompt.id.is_empty() => {
                    tracing::warn!("Prompt in {} has no id, skipping", path.display());
                    report.skipped.push(SkippedFile {
                        path,
                        reason: "prompt has no id".to_string(),
                    });
                }
                Ok(prompt) => {
                    if let Some(previous) = next.get(&prompt.id) {
                        tracing::debug!(
                            "Prompt id '{}' in {} replaces {}",
                            prompt.id,
                            path.display(),
                            previous.source.display()
                        );
                    }
                    next.insert(prompt.id.clone(), Arc::new(prompt));
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {e}", path.display());
                    report.skipped.push(SkippedFile {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        report.loaded = next.len();

        let previous = {
            let mut current = self
                .generation
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *current, next)
        };
        self.published.fetch_add(1, Ordering::Release);
        drop(previous);

        tracing::info!(
            "Loaded {} prompts from {} ({} skipped)",
            report.loaded,
            self.dir.display(),
            report.skipped.len()
        );

        Ok(report)
    }

    /// Number of generations published by successful reload passes.
    pub fn reload_count(&self) -> u64 {
        self.published.load(Ordering::Acquire)
    }

    /// Look up a prompt in the current generation.
    pub fn get(&self, id: &str) -> Option<Arc<Prompt>> {
        self.read().get(id).cloned()
    }

    /// Like [`get`](Self::get), but with a "prompt not found" error.
    pub fn require(&self, id: &str) -> CaddyResult<Arc<Prompt>> {
        self.get(id)
            .ok_or_else(|| CaddyError::PromptNotFound(id.to_string()))
    }

    /// Snapshot of every prompt in the current generation, in no particular order.
    pub fn list(&self) -> Vec<Arc<Prompt>> {
        self.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Generation> {
        self.generation
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Collect prompt source files under `dir`, sorted by name within each
/// directory so "last enumerated wins" is reproducible.
fn scan(dir: &Path) -> CaddyResult<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        if is_prompt_file(entry.path()) {
            paths.push(entry.into_path());
        }
    }

    Ok(paths)
}

/// Whether `path` carries the prompt source extension.
pub fn is_prompt_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == PROMPT_EXTENSION)
}

/// Parse one prompt file.
pub fn load_prompt(path: &Path) -> CaddyResult<Prompt> {
    let text = std::fs::read_to_string(path)?;
    let (meta, body) = frontmatter::split(&text)?;
    Prompt::from_parts(meta, body.to_string(), path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, Ordering};

    fn write(dir: &Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }

    fn prompt_file(id: &str, body: &str) -> String {
        format!("---\nid: {id}\ntitle: {id} title\nversion: 1.0\n---\n{body}")
    }

    #[test]
    fn test_reload_counts_loaded_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", &prompt_file("alpha", "A"));
        write(dir.path(), "nested/deep/b.md", &prompt_file("beta", "B"));
        write(dir.path(), "no_id.md", "---\ntitle: orphan\n---\nbody");
        write(dir.path(), "broken.md", "---\nid: [oops\n---\nbody");
        write(dir.path(), "unterminated.md", "---\nid: nope\n");
        write(dir.path(), "notes.txt", &prompt_file("ignored", "T"));

        let store = PromptStore::new(dir.path());
        let report = store.reload().unwrap();

        assert_eq!(report.loaded, 2);
        assert_eq!(report.skipped.len(), 3);
        assert_eq!(store.len(), 2);
        assert!(store.get("alpha").is_some());
        assert!(store.get("beta").is_some());
        assert!(store.get("ignored").is_none());
    }

    #[test]
    fn test_prompt_fields() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "greet.md",
            "---\nid: greet\ntitle: Greeting\ndescription: Says hello\nversion: 2\nparameters:\n  - name: name\n    description: Who to greet\n    type: string\n    required: true\n---\nHello {{name}}!",
        );

        let store = PromptStore::new(dir.path());
        store.reload().unwrap();

        let prompt = store.require("greet").unwrap();
        assert_eq!(prompt.title, "Greeting");
        assert_eq!(prompt.description, "Says hello");
        assert_eq!(prompt.version, "2");
        assert_eq!(prompt.body, "Hello {{name}}!");
        assert_eq!(prompt.parameters.len(), 1);
        assert!(prompt.parameters[0].required);
        assert!(prompt.source.ends_with("greet.md"));
    }

    #[test]
    fn test_identity_collision_last_wins() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", &prompt_file("x", "from a"));
        write(dir.path(), "b.md", &prompt_file("x", "from b"));

        let store = PromptStore::new(dir.path());
        let report = store.reload().unwrap();

        assert_eq!(report.loaded, 1);
        assert!(report.skipped.is_empty());
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.get("x").unwrap().body, "from b");
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store = PromptStore::new(dir.path().join("does-not-exist"));
        assert!(matches!(store.reload(), Err(CaddyError::Walk(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_failed_reload_keeps_generation() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("prompts");
        write(&root, "a.md", &prompt_file("alpha", "A"));

        let store = PromptStore::new(&root);
        assert_eq!(store.reload_count(), 0);
        store.reload().unwrap();
        std::fs::remove_dir_all(&root).unwrap();

        assert!(store.reload().is_err());
        assert!(store.get("alpha").is_some());
        assert_eq!(store.reload_count(), 1);
    }

    #[test]
    fn test_reload_replaces_whole_generation() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", &prompt_file("alpha", "A"));
        let store = PromptStore::new(dir.path());
        store.reload().unwrap();

        std::fs::remove_file(dir.path().join("a.md")).unwrap();
        write(dir.path(), "b.md", &prompt_file("beta", "B"));
        store.reload().unwrap();

        assert!(store.get("alpha").is_none());
        assert!(store.get("beta").is_some());
        assert!(matches!(
            store.require("alpha"),
            Err(CaddyError::PromptNotFound(_))
        ));
    }

    #[test]
    fn test_readers_never_see_partial_generation() {
        const FILES: usize = 20;

        let dir = tempfile::tempdir().unwrap();
        let active = dir.path().join("active");
        let staged = dir.path().join("staged");
        let parked = dir.path().join("parked");
        for i in 0..FILES {
            write(&active, &format!("p{i:02}.md"), &prompt_file(&format!("p{i}"), "old"));
            write(&staged, &format!("p{i:02}.md"), &prompt_file(&format!("p{i}"), "new"));
        }

        let store = Arc::new(PromptStore::new(&active));
        store.reload().unwrap();
        assert_eq!(store.len(), FILES);

        let done = Arc::new(AtomicBool::new(false));
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let done = Arc::clone(&done);
                std::thread::spawn(move || {
                    while !done.load(Ordering::Relaxed) {
                        let snapshot = store.list();
                        assert_eq!(snapshot.len(), FILES, "partial generation observed");
                        let old = snapshot.iter().filter(|p| p.body == "old").count();
                        assert!(old == 0 || old == FILES, "mixed generation observed");
                        assert!(store.get("p0").is_some());
                    }
                })
            })
            .collect();

        // Flip the active directory between two complete generations.
        for _ in 0..10 {
            std::fs::rename(&active, &parked).unwrap();
            std::fs::rename(&staged, &active).unwrap();
            std::fs::rename(&parked, &staged).unwrap();
            store.reload().unwrap();
        }

        done.store(true, Ordering::Relaxed);
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
