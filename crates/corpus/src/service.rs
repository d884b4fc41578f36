use jotledger_core::{CategoryDictionary, ConfigError, DateRange, LedgerConfig, TransactionRecord};
use jotledger_parser::RecordParser;
use jotledger_stats::AggregatedStats;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::cache::RecordCache;
use crate::locator::{DocumentLocator, LocateError};
use crate::notice::{LogNotifier, Notifier};
use crate::reader::CorpusReader;
use crate::search::SearchFacility;
use crate::store::CorpusStore;

#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("No corpus root configured")]
    NoRoot,
    #[error("Corpus root not found: {}", .0.display())]
    RootMissing(PathBuf),
    #[error(transparent)]
    Locate(#[from] LocateError),
}

/// Entry point for hosts: reload records from the corpus, filter them by
/// date, and compute statistics.
///
/// `reload` never fails. A missing root yields an empty list, and a
/// failed load falls back to the last cached records; either way the
/// host's `Notifier` is told.
pub struct LedgerService {
    store: Arc<dyn CorpusStore>,
    search: Option<Arc<dyn SearchFacility>>,
    notifier: Arc<dyn Notifier>,
    config: Arc<LedgerConfig>,
    parser: Arc<RecordParser>,
    locator: DocumentLocator,
    reader: CorpusReader,
    cache: Mutex<RecordCache<Vec<TransactionRecord>>>,
}

impl LedgerService {
    pub fn new(config: LedgerConfig, store: Arc<dyn CorpusStore>) -> Result<Self, ConfigError> {
        config.validate()?;
        let parser = Arc::new(RecordParser::new(&config));
        let locator = DocumentLocator::new(Arc::clone(&store), None, &parser);
        let reader = CorpusReader::new(Arc::clone(&store), Arc::clone(&parser));
        let cache = Mutex::new(RecordCache::new(config.corpus.cache_ttl()));

        Ok(Self {
            store,
            search: None,
            notifier: Arc::new(LogNotifier),
            config: Arc::new(config),
            parser,
            locator,
            reader,
            cache,
        })
    }

    pub fn with_search(mut self, search: Arc<dyn SearchFacility>) -> Self {
        self.search = Some(search);
        self.rebuild();
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Swaps in a new configuration as a whole and drops cached records.
    pub fn reconfigure(&mut self, config: LedgerConfig) -> Result<(), ConfigError> {
        config.validate()?;
        *self.cache.get_mut() = RecordCache::new(config.corpus.cache_ttl());
        self.config = Arc::new(config);
        self.rebuild();
        Ok(())
    }

    fn rebuild(&mut self) {
        self.parser = Arc::new(RecordParser::new(&self.config));
        self.locator = DocumentLocator::new(Arc::clone(&self.store), self.search.clone(), &self.parser);
        self.reader = CorpusReader::new(Arc::clone(&self.store), Arc::clone(&self.parser));
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn dictionary(&self) -> &CategoryDictionary {
        self.parser.dictionary()
    }

    /// All records in the corpus, newest first. Served from the cache
    /// unless it has expired or `force_refresh` is set.
    pub async fn reload(&self, force_refresh: bool) -> Arc<Vec<TransactionRecord>> {
        let mut cache = self.cache.lock().await;
        let result = if force_refresh {
            cache.refresh(|| self.load()).await
        } else {
            cache.get_or_recompute(|| self.load()).await
        };

        match result {
            Ok(records) => records,
            Err(e @ (ReloadError::NoRoot | ReloadError::RootMissing(_))) => {
                self.notifier.notify(&e.to_string());
                Arc::new(Vec::new())
            }
            Err(e) => {
                self.notifier.notify(&format!("Could not reload transactions: {e}"));
                cache.last().unwrap_or_default()
            }
        }
    }

    /// Drops cached records so the next `reload` reads the corpus again.
    pub async fn invalidate(&self) {
        self.cache.lock().await.invalidate();
    }

    async fn load(&self) -> Result<Vec<TransactionRecord>, ReloadError> {
        let root = self.config.corpus.root.clone().ok_or(ReloadError::NoRoot)?;
        if !self.store.document_exists(&root).await {
            return Err(ReloadError::RootMissing(root));
        }

        let located = self.locator.locate(&root).await?;
        let mut records = self.reader.read_all(&located.documents).await;
        records.sort_by(|a, b| b.date.cmp(&a.date));

        tracing::info!(
            tier = ?located.tier,
            documents = located.documents.len(),
            records = records.len(),
            "Reloaded transactions"
        );
        Ok(records)
    }

    pub fn filter_by_date_range(records: &[TransactionRecord], range: DateRange) -> Vec<TransactionRecord> {
        jotledger_stats::filter_by_date_range(records, range)
    }

    /// Aggregates `records`, with budget status when budgets are enabled.
    pub fn compute_stats(&self, records: &[TransactionRecord]) -> AggregatedStats {
        jotledger_stats::compute_stats(records, &self.config.budget, self.parser.dictionary())
    }
}
