use futures::future::join_all;
use jotledger_core::TransactionRecord;
use jotledger_parser::{context_date, RecordParser};
use std::sync::Arc;

use crate::store::{CorpusStore, DocumentHandle};

pub const READ_BATCH_SIZE: usize = 50;

/// Reads located documents and runs every line through the parser.
pub struct CorpusReader {
    store: Arc<dyn CorpusStore>,
    parser: Arc<RecordParser>,
    batch_size: usize,
}

impl CorpusReader {
    pub fn new(store: Arc<dyn CorpusStore>, parser: Arc<RecordParser>) -> Self {
        Self { store, parser, batch_size: READ_BATCH_SIZE }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Records from all `documents`, in document order then line order.
    /// A document that cannot be read or dated contributes nothing.
    pub async fn read_all(&self, documents: &[DocumentHandle]) -> Vec<TransactionRecord> {
        let mut records = Vec::new();
        for chunk in documents.chunks(self.batch_size) {
            let batch = join_all(chunk.iter().map(|handle| self.read_one(handle))).await;
            records.extend(batch.into_iter().flatten());
        }
        records
    }

    async fn read_one(&self, handle: &DocumentHandle) -> Vec<TransactionRecord> {
        let Some(date) = context_date(&handle.identity) else {
            tracing::debug!("No date in document name {}, skipping", handle.identity);
            return Vec::new();
        };

        match self.store.read_document(handle).await {
            Ok(content) => self.parser.parse_document(&content, date),
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}", handle.path.display());
                Vec::new()
            }
        }
    }
}
