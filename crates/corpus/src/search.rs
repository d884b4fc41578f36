use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search facility unavailable")]
    Unavailable,
    #[error("Search failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub path: PathBuf,
}

/// Optional full-text search offered by the host. A host without one
/// simply passes no facility; a facility that cannot serve a query
/// returns `SearchError::Unavailable`.
#[async_trait]
pub trait SearchFacility: Send + Sync {
    /// Documents under `scope` whose text contains `term`.
    async fn search(&self, term: &str, scope: &Path) -> Result<Vec<SearchHit>, SearchError>;
}
