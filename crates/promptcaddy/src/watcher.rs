//! Directory watcher that reloads a prompt store when prompt files change.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::event::{CreateKind, ModifyKind, RemoveKind};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::store::{is_prompt_file, PromptStore};
use crate::types::{CaddyError, CaddyResult};

/// Filesystem operation behind an event, as far as reloads care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOp {
    Create,
    Write,
    Remove,
    Rename,
    Other,
}

impl WatchOp {
    /// Whether this operation should trigger a reload.
    pub fn triggers_reload(self) -> bool {
        !matches!(self, WatchOp::Other)
    }
}

/// Map a `notify` event kind onto a [`WatchOp`]. Directory-level and
/// metadata-only events map to `Other`.
pub fn classify(kind: &EventKind) -> WatchOp {
    match kind {
        EventKind::Create(CreateKind::Folder) => WatchOp::Other,
        EventKind::Create(_) => WatchOp::Create,
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any) => {
            WatchOp::Write
        }
        EventKind::Modify(ModifyKind::Name(_)) => WatchOp::Rename,
        EventKind::Remove(RemoveKind::Folder) => WatchOp::Other,
        EventKind::Remove(_) => WatchOp::Remove,
        _ => WatchOp::Other,
    }
}

/// The prompt file an event refers to, if the event should trigger a reload.
pub fn qualifying_path(event: &Event) -> Option<&Path> {
    if !classify(&event.kind).triggers_reload() {
        return None;
    }
    event
        .paths
        .iter()
        .map(PathBuf::as_path)
        .find(|path| is_prompt_file(path))
}

enum WatchState {
    Idle,
    Running {
        watcher: RecommendedWatcher,
        stop: oneshot::Sender<()>,
        task: JoinHandle<()>,
    },
    Stopped,
}

/// Watches a store's directory and reloads the store on every qualifying
/// event. Events are not coalesced: N saves trigger N reload passes.
pub struct DirectoryWatcher {
    store: Arc<PromptStore>,
    state: WatchState,
}

impl DirectoryWatcher {
    pub fn new(store: Arc<PromptStore>) -> Self {
        Self {
            store,
            state: WatchState::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, WatchState::Running { .. })
    }

    /// Begin watching. Must be called from within a Tokio runtime.
    ///
    /// A watcher starts once; starting it again, or after `stop`, fails.
    pub fn start(&mut self) -> CaddyResult<()> {
        match self.state {
            WatchState::Idle => {}
            WatchState::Running { .. } => {
                return Err(CaddyError::Watcher("watcher already started".to_string()));
            }
            WatchState::Stopped => {
                return Err(CaddyError::Watcher(
                    "watcher cannot be restarted after stop".to_string(),
                ));
            }
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        })?;
        watcher.watch(self.store.dir(), RecursiveMode::Recursive)?;

        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(watch_loop(Arc::clone(&self.store), rx, stop_rx));

        tracing::info!("Watching {} for prompt changes", self.store.dir().display());

        self.state = WatchState::Running {
            watcher,
            stop: stop_tx,
            task,
        };
        Ok(())
    }

    /// Cancel the background task and release the OS watch handle.
    ///
    /// Waits for an in-flight reload to finish, so no reload runs after this
    /// returns. Calling `stop` more than once is harmless.
    pub async fn stop(&mut self) {
        if let WatchState::Running {
            watcher,
            stop,
            task,
        } = std::mem::replace(&mut self.state, WatchState::Stopped)
        {
            let _ = stop.send(());
            drop(watcher);
            if let Err(e) = task.await {
                tracing::error!("Watcher task failed: {e}");
            }
            tracing::info!("Stopped watching {}", self.store.dir().display());
        }
    }
}

impl Drop for DirectoryWatcher {
    fn drop(&mut self) {
        if let WatchState::Running { stop, .. } =
            std::mem::replace(&mut self.state, WatchState::Stopped)
        {
            let _ = stop.send(());
        }
    }
}

async fn watch_loop(
    store: Arc<PromptStore>,
    mut events: mpsc::UnboundedReceiver<notify::Result<Event>>,
    mut stop: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            biased;
            _ = &mut stop => break,
            event = events.recv() => match event {
                Some(Ok(event)) => {
                    if let Some(path) = qualifying_path(&event) {
                        reload(&store, path.to_path_buf()).await;
                    }
                }
                Some(Err(e)) => tracing::warn!("Watcher error: {e}"),
                None => break,
            },
        }
    }
}

async fn reload(store: &Arc<PromptStore>, changed: PathBuf) {
    let store = Arc::clone(store);
    match tokio::task::spawn_blocking(move || store.reload()).await {
        Ok(Ok(_)) => tracing::info!("Reloaded prompts after change to {}", changed.display()),
        Ok(Err(e)) => tracing::error!("Error reloading prompts: {e}"),
        Err(e) => tracing::error!("Reload task failed: {e}"),
    }
}
