use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corpus root not found: {}", .0.display())]
    RootMissing(PathBuf),
    #[error("Document not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// A document in the external store. `identity` is its file name, which
/// for daily documents carries the date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DocumentHandle {
    pub identity: String,
    pub path: PathBuf,
}

impl DocumentHandle {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let identity = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { identity, path }
    }
}

/// Read-only access to the document store owned by the host.
#[async_trait]
pub trait CorpusStore: Send + Sync {
    /// Every document at or below `prefix`.
    async fn list_documents(&self, prefix: &Path) -> Result<Vec<DocumentHandle>, CorpusError>;

    async fn read_document(&self, handle: &DocumentHandle) -> Result<String, CorpusError>;

    async fn document_exists(&self, path: &Path) -> bool;
}

pub(crate) fn has_extension(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

// ── Filesystem store ──────────────────────────────────────────────────────────

/// Documents are regular files under a directory tree. Hidden directories
/// (`.git`, editor metadata) are not descended into.
#[derive(Debug, Clone)]
pub struct FsCorpus {
    extensions: Vec<String>,
}

impl FsCorpus {
    pub fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }
}

#[async_trait]
impl CorpusStore for FsCorpus {
    async fn list_documents(&self, prefix: &Path) -> Result<Vec<DocumentHandle>, CorpusError> {
        let meta = match tokio::fs::metadata(prefix).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CorpusError::RootMissing(prefix.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };
        if meta.is_file() {
            return Ok(if has_extension(prefix, &self.extensions) {
                vec![DocumentHandle::from_path(prefix)]
            } else {
                vec![]
            });
        }

        let mut documents = Vec::new();
        let mut pending = vec![prefix.to_path_buf()];
        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                // The root itself must be readable; nested folders are skipped.
                Err(e) if dir != prefix => {
                    tracing::warn!("Skipping unreadable folder {}: {e}", dir.display());
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) if dir != prefix => {
                        tracing::warn!("Stopped listing folder {}: {e}", dir.display());
                        break;
                    }
                    Err(e) => return Err(e.into()),
                };
                let path = entry.path();
                let file_type = match entry.file_type().await {
                    Ok(file_type) => file_type,
                    Err(e) => {
                        tracing::warn!("Skipping unreadable entry {}: {e}", path.display());
                        continue;
                    }
                };
                if file_type.is_dir() {
                    if !is_hidden(&path) {
                        pending.push(path);
                    }
                } else if file_type.is_file() && has_extension(&path, &self.extensions) {
                    documents.push(DocumentHandle::from_path(path));
                }
            }
        }

        documents.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(documents)
    }

    async fn read_document(&self, handle: &DocumentHandle) -> Result<String, CorpusError> {
        match tokio::fs::read_to_string(&handle.path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CorpusError::NotFound(handle.path.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn document_exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }
}

// ── In-memory store ───────────────────────────────────────────────────────────

/// A store backed by a map of path → content. Useful for hosts that already
/// hold their documents in memory, and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryCorpus {
    documents: BTreeMap<PathBuf, String>,
}

impl MemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.documents.insert(path.into(), content.into());
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl CorpusStore for MemoryCorpus {
    async fn list_documents(&self, prefix: &Path) -> Result<Vec<DocumentHandle>, CorpusError> {
        Ok(self
            .documents
            .keys()
            .filter(|p| p.starts_with(prefix))
            .map(DocumentHandle::from_path)
            .collect())
    }

    async fn read_document(&self, handle: &DocumentHandle) -> Result<String, CorpusError> {
        self.documents
            .get(&handle.path)
            .cloned()
            .ok_or_else(|| CorpusError::NotFound(handle.path.clone()))
    }

    /// True for a stored document or for any folder that contains one.
    async fn document_exists(&self, path: &Path) -> bool {
        self.documents.keys().any(|p| p.starts_with(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_identity_is_file_name() {
        let h = DocumentHandle::from_path("/vault/daily/2024-03-10.md");
        assert_eq!(h.identity, "2024-03-10.md");
        assert_eq!(h.path, PathBuf::from("/vault/daily/2024-03-10.md"));
    }

    #[test]
    fn extension_filter_is_case_insensitive() {
        let exts = vec!["md".to_string()];
        assert!(has_extension(Path::new("a/2024-03-10.MD"), &exts));
        assert!(!has_extension(Path::new("a/photo.png"), &exts));
        assert!(!has_extension(Path::new("a/README"), &exts));
        assert!(has_extension(Path::new("a/README"), &[]));
    }

    #[tokio::test]
    async fn memory_corpus_lists_by_prefix() {
        let store = MemoryCorpus::new()
            .with_document("/vault/daily/2024-03-10.md", "#cy 30 lunch")
            .with_document("/vault/ideas.md", "nothing");

        let daily = store.list_documents(Path::new("/vault/daily")).await.unwrap();
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].identity, "2024-03-10.md");

        let all = store.list_documents(Path::new("/vault")).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(store.document_exists(Path::new("/vault")).await);
        assert!(!store.document_exists(Path::new("/elsewhere")).await);
    }

    #[tokio::test]
    async fn memory_corpus_missing_document_is_not_found() {
        let store = MemoryCorpus::new();
        let err = store
            .read_document(&DocumentHandle::from_path("/vault/gone.md"))
            .await
            .unwrap_err();
        assert!(matches!(err, CorpusError::NotFound(_)));
    }

    #[tokio::test]
    async fn fs_corpus_walks_tree_and_skips_hidden() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("2024/03")).unwrap();
        std::fs::create_dir_all(root.join(".obsidian")).unwrap();
        std::fs::write(root.join("2024/03/2024-03-10.md"), "#cy 30 lunch").unwrap();
        std::fs::write(root.join("2024/03/photo.png"), [0u8, 1, 2]).unwrap();
        std::fs::write(root.join(".obsidian/2024-03-11.md"), "#cy 1 hidden").unwrap();
        std::fs::write(root.join("inbox.txt"), "todo").unwrap();

        let store = FsCorpus::new(vec!["md".to_string(), "txt".to_string()]);
        let docs = store.list_documents(root).await.unwrap();
        let names: Vec<&str> = docs.iter().map(|d| d.identity.as_str()).collect();
        assert_eq!(names, vec!["2024-03-10.md", "inbox.txt"]);

        let content = store.read_document(&docs[0]).await.unwrap();
        assert_eq!(content, "#cy 30 lunch");
        assert!(store.document_exists(root).await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn fs_corpus_skips_broken_nested_entries() {
        use std::os::unix::fs::{symlink, PermissionsExt};

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("locked")).unwrap();
        std::fs::write(root.join("locked/2024-03-09.md"), "#cy 2 tea").unwrap();
        std::fs::set_permissions(root.join("locked"), std::fs::Permissions::from_mode(0o000)).unwrap();
        symlink(root.join("gone"), root.join("dangling.md")).unwrap();
        std::fs::write(root.join("2024-03-10.md"), "#cy 30 lunch").unwrap();

        let store = FsCorpus::new(vec!["md".to_string()]);
        let docs = store.list_documents(root).await;
        std::fs::set_permissions(root.join("locked"), std::fs::Permissions::from_mode(0o755)).unwrap();

        let docs = docs.unwrap();
        assert!(docs.iter().any(|d| d.identity == "2024-03-10.md"));
        assert!(!docs.iter().any(|d| d.identity == "dangling.md"));
    }

    #[tokio::test]
    async fn fs_corpus_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let store = FsCorpus::new(vec!["md".to_string()]);
        let err = store.list_documents(&missing).await.unwrap_err();
        assert!(matches!(err, CorpusError::RootMissing(_)));
        assert!(!store.document_exists(&missing).await);
    }
}
