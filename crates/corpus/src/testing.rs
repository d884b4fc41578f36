use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::store::{CorpusError, CorpusStore, DocumentHandle, MemoryCorpus};

/// Records the highest number of reads in flight at once. The first
/// `failed_listings` listings fail.
pub(crate) struct CountingReads {
    inner: MemoryCorpus,
    failed_listings: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl CountingReads {
    pub(crate) fn new(inner: MemoryCorpus, failed_listings: usize) -> Self {
        Self {
            inner,
            failed_listings: AtomicUsize::new(failed_listings),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub(crate) fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CorpusStore for CountingReads {
    async fn list_documents(&self, prefix: &Path) -> Result<Vec<DocumentHandle>, CorpusError> {
        let left = self.failed_listings.load(Ordering::SeqCst);
        if left > 0 {
            self.failed_listings.store(left - 1, Ordering::SeqCst);
            return Err(std::io::Error::other("listing unavailable").into());
        }
        self.inner.list_documents(prefix).await
    }

    async fn read_document(&self, handle: &DocumentHandle) -> Result<String, CorpusError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        let content = self.inner.read_document(handle).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        content
    }

    async fn document_exists(&self, path: &Path) -> bool {
        self.inner.document_exists(path).await
    }
}

/// `days` dated documents from 2024-01-01, each holding one transaction.
pub(crate) fn dated_corpus(root: &str, days: u64) -> MemoryCorpus {
    let mut store = MemoryCorpus::new();
    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    for day in 0..days {
        let date = start + chrono::Days::new(day);
        store.insert(format!("{root}/{date}.md"), "#cy 10 lunch");
    }
    store
}
