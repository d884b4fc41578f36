pub mod config;
pub mod dictionary;
pub mod money;
pub mod period;
pub mod record;

pub use config::{BudgetConfig, ConfigError, CorpusConfig, LedgerConfig};
pub use dictionary::{CategoryDictionary, UNCATEGORIZED};
pub use money::Money;
pub use period::DateRange;
pub use record::TransactionRecord;
