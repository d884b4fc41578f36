pub mod aggregate;
pub mod budget;
pub mod filter;

pub use aggregate::{aggregate, AggregatedStats, CategoryBucket, DailyBucket};
pub use budget::{evaluate, AlertKind, AlertScope, BudgetAlert, BudgetStatus, CategoryBudgetStatus};
pub use filter::filter_by_date_range;

use jotledger_core::{BudgetConfig, CategoryDictionary, TransactionRecord};

/// Aggregates `records` and attaches the budget view, if budgets are enabled.
pub fn compute_stats(
    records: &[TransactionRecord],
    budget: &BudgetConfig,
    dictionary: &CategoryDictionary,
) -> AggregatedStats {
    let mut stats = aggregate(records);
    stats.budget = evaluate(&stats, budget, dictionary);
    stats
}
