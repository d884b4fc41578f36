use jotledger_core::{DateRange, TransactionRecord};

/// Records whose economic date falls inside `range`, both ends inclusive.
/// Input order is preserved.
pub fn filter_by_date_range(records: &[TransactionRecord], range: DateRange) -> Vec<TransactionRecord> {
    records
        .iter()
        .filter(|r| range.contains(r.date))
        .cloned()
        .collect()
}
