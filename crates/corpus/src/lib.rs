pub mod cache;
pub mod locator;
pub mod notice;
pub mod reader;
pub mod search;
pub mod service;
pub mod store;
pub mod watcher;

#[cfg(test)]
mod testing;

pub use cache::RecordCache;
pub use locator::{DocumentLocator, LocateError, Located, Tier};
pub use notice::{LogNotifier, Notifier};
pub use reader::CorpusReader;
pub use search::{SearchError, SearchFacility, SearchHit};
pub use service::{LedgerService, ReloadError};
pub use store::{CorpusError, CorpusStore, DocumentHandle, FsCorpus, MemoryCorpus};
pub use watcher::spawn_corpus_watcher;
