use chrono::NaiveDate;
use jotledger_core::{Money, TransactionRecord};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::budget::BudgetStatus;

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryBucket {
    pub total: Money,
    pub count: usize,
    pub records: Vec<TransactionRecord>,
}

impl CategoryBucket {
    /// Sum of the expense records only.
    pub fn expense_total(&self) -> Money {
        self.records
            .iter()
            .filter(|r| r.is_expense())
            .map(|r| r.amount)
            .sum()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DailyBucket {
    pub income: Money,
    pub expense: Money,
    pub records: Vec<TransactionRecord>,
}

/// Totals over one record collection. Always rebuilt from scratch;
/// nothing here is updated incrementally.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregatedStats {
    pub total_income: Money,
    pub total_expense: Money,
    /// Keyed by category display name.
    pub by_category: BTreeMap<String, CategoryBucket>,
    /// Keyed by economic date, so backfilled records land on their own day.
    pub by_date: BTreeMap<NaiveDate, DailyBucket>,
    pub budget: Option<BudgetStatus>,
}

pub fn aggregate(records: &[TransactionRecord]) -> AggregatedStats {
    let mut stats = AggregatedStats::default();

    for record in records {
        if record.is_income {
            stats.total_income += record.amount;
        } else {
            stats.total_expense += record.amount;
        }

        let bucket = stats.by_category.entry(record.category.clone()).or_default();
        bucket.total += record.amount;
        bucket.count += 1;
        bucket.records.push(record.clone());

        let day = stats.by_date.entry(record.date).or_default();
        if record.is_income {
            day.income += record.amount;
        } else {
            day.expense += record.amount;
        }
        day.records.push(record.clone());
    }

    stats
}

impl AggregatedStats {
    pub fn net(&self) -> Money {
        self.total_income - self.total_expense
    }

    pub fn record_count(&self) -> usize {
        self.by_category.values().map(|b| b.count).sum()
    }

    pub fn backfill_count(&self) -> usize {
        self.by_date
            .values()
            .flat_map(|d| d.records.iter())
            .filter(|r| r.is_backfill())
            .count()
    }

    /// Expense totals per category, largest first. Categories with no
    /// expense records are left out.
    pub fn expense_categories(&self) -> Vec<(&str, Money)> {
        let mut out: Vec<(&str, Money)> = self
            .by_category
            .iter()
            .map(|(name, bucket)| (name.as_str(), bucket.expense_total()))
            .filter(|(_, total)| total.is_positive())
            .collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        out
    }

    /// `(date, income, expense)` in ascending date order.
    pub fn daily_series(&self) -> impl Iterator<Item = (NaiveDate, Money, Money)> + '_ {
        self.by_date.iter().map(|(date, d)| (*date, d.income, d.expense))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rec(date: NaiveDate, keyword: &str, category: &str, cents: i64, is_income: bool) -> TransactionRecord {
        TransactionRecord {
            date,
            source_date: date,
            keyword: keyword.to_string(),
            category: category.to_string(),
            amount: Money::from_cents(cents),
            is_income,
            description: String::new(),
            raw_text: format!("#{keyword} {cents}"),
        }
    }

    fn sample() -> Vec<TransactionRecord> {
        vec![
            rec(d(2024, 3, 1), "cy", "Dining", 3000, false),
            rec(d(2024, 3, 1), "sr", "Income", 500_000, true),
            rec(d(2024, 3, 2), "cy", "Dining", 1250, false),
            rec(d(2024, 3, 2), "jt", "Transport", 400, false),
            rec(d(2024, 3, 5), "gw", "Shopping", 9900, false),
        ]
    }

    #[test]
    fn empty_input_is_all_zero() {
        let stats = aggregate(&[]);
        assert!(stats.total_income.is_zero());
        assert!(stats.total_expense.is_zero());
        assert!(stats.by_category.is_empty());
        assert!(stats.by_date.is_empty());
        assert!(stats.budget.is_none());
    }

    #[test]
    fn totals_split_income_and_expense() {
        let stats = aggregate(&sample());
        assert_eq!(stats.total_income, Money::from_cents(500_000));
        assert_eq!(stats.total_expense, Money::from_cents(14_550));
        assert_eq!(stats.net(), Money::from_cents(485_450));
        assert_eq!(stats.record_count(), 5);
    }

    #[test]
    fn category_totals_cover_everything() {
        let stats = aggregate(&sample());
        let sum: Money = stats.by_category.values().map(|b| b.total).sum();
        assert_eq!(sum, stats.total_income + stats.total_expense);

        let dining = &stats.by_category["Dining"];
        assert_eq!(dining.total, Money::from_cents(4250));
        assert_eq!(dining.count, 2);
        assert_eq!(dining.records.len(), 2);
    }

    #[test]
    fn daily_income_sums_to_total_income() {
        let stats = aggregate(&sample());
        let income: Money = stats.by_date.values().map(|b| b.income).sum();
        let expense: Money = stats.by_date.values().map(|b| b.expense).sum();
        assert_eq!(income, stats.total_income);
        assert_eq!(expense, stats.total_expense);
        assert_eq!(stats.by_date[&d(2024, 3, 2)].expense, Money::from_cents(1650));
    }

    #[test]
    fn backfilled_record_counts_on_its_economic_date() {
        let mut late = rec(d(2024, 2, 28), "cy", "Dining", 800, false);
        late.source_date = d(2024, 3, 1);
        let stats = aggregate(&[late]);
        assert!(stats.by_date.contains_key(&d(2024, 2, 28)));
        assert!(!stats.by_date.contains_key(&d(2024, 3, 1)));
        assert_eq!(stats.backfill_count(), 1);
    }

    #[test]
    fn expense_categories_largest_first_without_income() {
        let stats = aggregate(&sample());
        let names: Vec<&str> = stats.expense_categories().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["Shopping", "Dining", "Transport"]);
    }

    #[test]
    fn daily_series_is_date_ascending() {
        let stats = aggregate(&sample());
        let dates: Vec<NaiveDate> = stats.daily_series().map(|(date, _, _)| date).collect();
        assert_eq!(dates, vec![d(2024, 3, 1), d(2024, 3, 2), d(2024, 3, 5)]);
    }

    #[test]
    fn aggregation_is_deterministic() {
        let records = sample();
        let a = serde_json::to_string(&aggregate(&records)).unwrap();
        let b = serde_json::to_string(&aggregate(&records)).unwrap();
        assert_eq!(a, b);
    }
}
