use futures::future::join_all;
use jotledger_parser::{dated_identity, keyword_alternation, RecordParser};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::search::{SearchError, SearchFacility};
use crate::store::{CorpusError, CorpusStore, DocumentHandle};

/// Concurrent reads per batch when scanning dated documents.
pub const PREFILTER_BATCH_SIZE: usize = 50;
/// Concurrent reads per batch when scanning the whole corpus.
pub const FULL_SCAN_BATCH_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Host search facility.
    Search,
    /// Content scan of dated documents.
    Prefiltered,
    /// Marker scan of every document.
    FullScan,
}

#[derive(Debug, Clone)]
pub struct Located {
    pub tier: Tier,
    pub documents: Vec<DocumentHandle>,
}

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("All retrieval tiers failed: {0}")]
    AllTiersFailed(#[source] CorpusError),
}

/// Narrows the corpus down to the documents that may hold transactions.
///
/// Tiers are tried in order. The search tier hands over on failure or on
/// an empty result. The prefiltered scan is final whenever it runs to
/// completion, even with no matches; only a failure falls through to the
/// full scan.
pub struct DocumentLocator {
    store: Arc<dyn CorpusStore>,
    search: Option<Arc<dyn SearchFacility>>,
    marker: String,
    keywords: Vec<String>,
    /// `None` when there are no keywords.
    content_pattern: Option<Regex>,
}

impl DocumentLocator {
    pub fn new(
        store: Arc<dyn CorpusStore>,
        search: Option<Arc<dyn SearchFacility>>,
        parser: &RecordParser,
    ) -> Self {
        let dictionary = parser.dictionary();
        let marker = parser.marker().to_string();
        let content_pattern = if dictionary.is_empty() {
            None
        } else {
            let pattern = format!(
                r"{}\s*(?:{}).*?[0-9.]",
                regex::escape(&marker),
                keyword_alternation(dictionary)
            );
            Regex::new(&pattern).ok()
        };

        Self {
            store,
            search,
            marker,
            keywords: dictionary.keywords().map(str::to_string).collect(),
            content_pattern,
        }
    }

    pub async fn locate(&self, root: &Path) -> Result<Located, LocateError> {
        match self.search_tier(root).await {
            Ok(documents) if !documents.is_empty() => {
                tracing::info!("Search tier located {} documents", documents.len());
                return Ok(Located { tier: Tier::Search, documents });
            }
            Ok(_) => tracing::debug!("Search tier found nothing, scanning dated documents"),
            Err(e) => tracing::warn!("Search tier failed, scanning dated documents: {e}"),
        }

        match self.prefiltered_tier(root).await {
            Ok(documents) => {
                tracing::info!("Prefiltered scan located {} documents", documents.len());
                return Ok(Located { tier: Tier::Prefiltered, documents });
            }
            Err(e) => tracing::warn!("Prefiltered scan failed, scanning whole corpus: {e}"),
        }

        let documents = self.full_scan_tier(root).await.map_err(LocateError::AllTiersFailed)?;
        tracing::info!("Full scan located {} documents", documents.len());
        Ok(Located { tier: Tier::FullScan, documents })
    }

    // ── Tier 1 ────────────────────────────────────────────────────────────────

    async fn search_tier(&self, root: &Path) -> Result<Vec<DocumentHandle>, SearchError> {
        let search = self.search.as_ref().ok_or(SearchError::Unavailable)?;

        let mut hits: BTreeMap<PathBuf, DocumentHandle> = BTreeMap::new();
        for keyword in &self.keywords {
            let term = format!("{}{keyword}", self.marker);
            for hit in search.search(&term, root).await? {
                if hit.path.starts_with(root) {
                    hits.entry(hit.path.clone())
                        .or_insert_with(|| DocumentHandle::from_path(hit.path));
                }
            }
        }

        // The index may lag behind the store.
        let mut documents = Vec::with_capacity(hits.len());
        for (path, handle) in hits {
            if self.store.document_exists(&path).await {
                documents.push(handle);
            } else {
                tracing::debug!("Dropping stale search hit {}", path.display());
            }
        }
        Ok(documents)
    }

    // ── Tier 2 ────────────────────────────────────────────────────────────────

    async fn prefiltered_tier(&self, root: &Path) -> Result<Vec<DocumentHandle>, CorpusError> {
        let candidates: Vec<DocumentHandle> = self
            .store
            .list_documents(root)
            .await?
            .into_iter()
            .filter(|h| dated_identity(&h.identity).is_some())
            .collect();

        let Some(pattern) = &self.content_pattern else {
            return Ok(Vec::new());
        };
        Ok(self
            .filter_by_content(candidates, PREFILTER_BATCH_SIZE, |text| pattern.is_match(text))
            .await)
    }

    // ── Tier 3 ────────────────────────────────────────────────────────────────

    async fn full_scan_tier(&self, root: &Path) -> Result<Vec<DocumentHandle>, CorpusError> {
        let candidates = self.store.list_documents(root).await?;
        let marker = self.marker.as_str();
        Ok(self
            .filter_by_content(candidates, FULL_SCAN_BATCH_SIZE, |text| text.contains(marker))
            .await)
    }

    /// Reads candidates in batches of `batch_size` and keeps those whose
    /// content passes `test`. Unreadable documents are logged and skipped.
    async fn filter_by_content<F>(
        &self,
        candidates: Vec<DocumentHandle>,
        batch_size: usize,
        test: F,
    ) -> Vec<DocumentHandle>
    where
        F: Fn(&str) -> bool + Sync,
    {
        let test = &test;
        let mut matched = Vec::new();

        for chunk in candidates.chunks(batch_size.max(1)) {
            let futures: Vec<_> = chunk
                .iter()
                .map(|handle| async move {
                    match self.store.read_document(handle).await {
                        Ok(content) => test(&content).then(|| handle.clone()),
                        Err(e) => {
                            tracing::warn!("Skipping unreadable document {}: {e}", handle.path.display());
                            None
                        }
                    }
                })
                .collect();

            matched.extend(join_all(futures).await.into_iter().flatten());
        }

        matched
    }
}
