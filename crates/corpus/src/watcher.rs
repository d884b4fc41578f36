use notify::{Event, EventKind};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use crate::store::has_extension;

/// Paths in `event` that are documents and were created, changed or removed.
fn changed_documents(event: Event, extensions: &[String]) -> Vec<PathBuf> {
    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => event
            .paths
            .into_iter()
            .filter(|p| has_extension(p, extensions))
            .collect(),
        _ => Vec::new(),
    }
}

/// Watch `root` recursively and send each changed document path to `tx`.
/// Returns the watcher, which must be kept alive for watching to continue.
pub fn spawn_corpus_watcher(
    root: &Path,
    extensions: Vec<String>,
    tx: mpsc::Sender<PathBuf>,
) -> notify::Result<impl notify::Watcher> {
    use notify::{RecursiveMode, Watcher};

    let mut watcher = notify::recommended_watcher(move |event: notify::Result<Event>| match event {
        Ok(ev) => {
            for path in changed_documents(ev, &extensions) {
                // A full channel already has a reload pending.
                let _ = tx.try_send(path);
            }
        }
        Err(e) => tracing::warn!("Corpus watcher error: {e}"),
    })?;

    watcher.watch(root, RecursiveMode::Recursive)?;
    Ok(watcher)
}
