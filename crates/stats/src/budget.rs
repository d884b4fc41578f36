use jotledger_core::{BudgetConfig, CategoryDictionary, Money};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

use crate::aggregate::AggregatedStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Warning,
    Exceeded,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertKind::Warning => write!(f, "warning"),
            AlertKind::Exceeded => write!(f, "exceeded"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "scope", content = "category")]
pub enum AlertScope {
    Total,
    Category(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetAlert {
    pub scope: AlertScope,
    pub kind: AlertKind,
    pub budget: Money,
    pub spent: Money,
    pub progress: Decimal,
}

impl fmt::Display for BudgetAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let percent = self.progress * Decimal::ONE_HUNDRED;
        match &self.scope {
            AlertScope::Total => write!(
                f,
                "Total budget {}: spent {} of {} ({percent:.1}%)",
                self.kind, self.spent, self.budget
            ),
            AlertScope::Category(name) => write!(
                f,
                "Budget for '{name}' {}: spent {} of {} ({percent:.1}%)",
                self.kind, self.spent, self.budget
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryBudgetStatus {
    pub keyword: String,
    pub category: String,
    pub budget: Money,
    pub spent: Money,
    pub remaining: Money,
    pub progress: Decimal,
}

/// Budget view derived from stats plus static configuration. It has no
/// identity of its own and is recomputed together with the stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetStatus {
    pub total_budget: Money,
    pub total_spent: Money,
    pub total_remaining: Money,
    /// May exceed 1. Zero when no total budget is set.
    pub total_progress: Decimal,
    pub categories: Vec<CategoryBudgetStatus>,
    /// Total alert first, then categories in keyword order.
    pub alerts: Vec<BudgetAlert>,
}

fn classify(progress: Decimal, threshold: Decimal) -> Option<AlertKind> {
    if progress >= Decimal::ONE {
        Some(AlertKind::Exceeded)
    } else if progress >= threshold {
        Some(AlertKind::Warning)
    } else {
        None
    }
}

/// Returns `None` when budgets are disabled.
pub fn evaluate(
    stats: &AggregatedStats,
    config: &BudgetConfig,
    dictionary: &CategoryDictionary,
) -> Option<BudgetStatus> {
    if !config.enabled {
        return None;
    }

    let threshold = config.alert_threshold;
    let mut alerts = Vec::new();

    let total_budget = config.monthly_total;
    let total_spent = stats.total_expense;
    // An unset total budget never alerts.
    let total_progress = total_spent.ratio_of(total_budget).unwrap_or(Decimal::ZERO);
    if total_budget.is_positive() {
        if let Some(kind) = classify(total_progress, threshold) {
            alerts.push(BudgetAlert {
                scope: AlertScope::Total,
                kind,
                budget: total_budget,
                spent: total_spent,
                progress: total_progress,
            });
        }
    }

    let mut categories = Vec::new();
    for (keyword, budget) in config.categories.iter().filter(|(_, b)| b.is_positive()) {
        let category = dictionary.resolve(keyword).to_string();
        let spent = stats
            .by_category
            .get(&category)
            .map_or(Money::zero(), |bucket| bucket.expense_total());
        let progress = spent.ratio_of(*budget).unwrap_or(Decimal::ZERO);

        if let Some(kind) = classify(progress, threshold) {
            alerts.push(BudgetAlert {
                scope: AlertScope::Category(category.clone()),
                kind,
                budget: *budget,
                spent,
                progress,
            });
        }

        categories.push(CategoryBudgetStatus {
            keyword: keyword.clone(),
            category,
            budget: *budget,
            spent,
            remaining: *budget - spent,
            progress,
        });
    }

    Some(BudgetStatus {
        total_budget,
        total_spent,
        total_remaining: total_budget - total_spent,
        total_progress,
        categories,
        alerts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use chrono::NaiveDate;
    use jotledger_core::TransactionRecord;

    fn rec(keyword: &str, category: &str, cents: i64, is_income: bool) -> TransactionRecord {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        TransactionRecord {
            date,
            source_date: date,
            keyword: keyword.to_string(),
            category: category.to_string(),
            amount: Money::from_cents(cents),
            is_income,
            description: String::new(),
            raw_text: String::new(),
        }
    }

    fn dictionary() -> CategoryDictionary {
        CategoryDictionary::new([("cy", "Dining"), ("gw", "Shopping"), ("sr", "Income")])
    }

    fn config(monthly_cents: i64, categories: &[(&str, i64)]) -> BudgetConfig {
        BudgetConfig {
            enabled: true,
            monthly_total: Money::from_cents(monthly_cents),
            alert_threshold: Decimal::new(8, 1),
            categories: categories
                .iter()
                .map(|(k, c)| (k.to_string(), Money::from_cents(*c)))
                .collect(),
        }
    }

    fn dining_alerts(spent_cents: i64) -> Vec<BudgetAlert> {
        let stats = aggregate(&[rec("cy", "Dining", spent_cents, false)]);
        evaluate(&stats, &config(0, &[("cy", 10_000)]), &dictionary())
            .unwrap()
            .alerts
    }

    #[test]
    fn disabled_budget_yields_none() {
        let mut cfg = config(100_000, &[]);
        cfg.enabled = false;
        assert!(evaluate(&aggregate(&[]), &cfg, &dictionary()).is_none());
    }

    #[test]
    fn category_alert_boundaries() {
        let at_threshold = dining_alerts(8_000);
        assert_eq!(at_threshold.len(), 1);
        assert_eq!(at_threshold[0].kind, AlertKind::Warning);
        assert_eq!(at_threshold[0].scope, AlertScope::Category("Dining".to_string()));

        let at_budget = dining_alerts(10_000);
        assert_eq!(at_budget.len(), 1);
        assert_eq!(at_budget[0].kind, AlertKind::Exceeded);

        assert!(dining_alerts(7_900).is_empty());
    }

    #[test]
    fn total_progress_and_remaining() {
        let stats = aggregate(&[
            rec("cy", "Dining", 30_000, false),
            rec("gw", "Shopping", 60_000, false),
            rec("sr", "Income", 900_000, true),
        ]);
        let status = evaluate(&stats, &config(100_000, &[]), &dictionary()).unwrap();
        assert_eq!(status.total_spent, Money::from_cents(90_000));
        assert_eq!(status.total_remaining, Money::from_cents(10_000));
        assert_eq!(status.total_progress, Decimal::new(9, 1));
        assert_eq!(status.alerts.len(), 1);
        assert_eq!(status.alerts[0].scope, AlertScope::Total);
        assert_eq!(status.alerts[0].kind, AlertKind::Warning);
    }

    #[test]
    fn overspent_total_can_exceed_one() {
        let stats = aggregate(&[rec("cy", "Dining", 15_000, false)]);
        let status = evaluate(&stats, &config(10_000, &[]), &dictionary()).unwrap();
        assert_eq!(status.total_progress, Decimal::new(15, 1));
        assert_eq!(status.total_remaining, Money::from_cents(-5_000));
        assert_eq!(status.alerts[0].kind, AlertKind::Exceeded);
    }

    #[test]
    fn unset_total_budget_never_alerts() {
        let stats = aggregate(&[rec("cy", "Dining", 15_000, false)]);
        let status = evaluate(&stats, &config(0, &[]), &dictionary()).unwrap();
        assert_eq!(status.total_progress, Decimal::ZERO);
        assert!(status.alerts.is_empty());
    }

    #[test]
    fn idle_category_has_zero_spent() {
        let status = evaluate(&aggregate(&[]), &config(0, &[("gw", 5_000)]), &dictionary()).unwrap();
        let shopping = &status.categories[0];
        assert_eq!(shopping.category, "Shopping");
        assert!(shopping.spent.is_zero());
        assert_eq!(shopping.remaining, Money::from_cents(5_000));
        assert!(status.alerts.is_empty());
    }

    #[test]
    fn zero_category_budgets_are_skipped() {
        let status = evaluate(&aggregate(&[]), &config(0, &[("cy", 0)]), &dictionary()).unwrap();
        assert!(status.categories.is_empty());
    }

    #[test]
    fn unknown_budget_keyword_resolves_uncategorized() {
        let status = evaluate(&aggregate(&[]), &config(0, &[("zz", 100)]), &dictionary()).unwrap();
        assert_eq!(status.categories[0].category, jotledger_core::UNCATEGORIZED);
    }

    #[test]
    fn total_alert_precedes_category_alerts() {
        let stats = aggregate(&[rec("cy", "Dining", 20_000, false)]);
        let status = evaluate(&stats, &config(20_000, &[("cy", 10_000)]), &dictionary()).unwrap();
        let scopes: Vec<&AlertScope> = status.alerts.iter().map(|a| &a.scope).collect();
        assert_eq!(
            scopes,
            vec![&AlertScope::Total, &AlertScope::Category("Dining".to_string())]
        );
    }

    #[test]
    fn alert_message_mentions_category_and_percent() {
        let alert = &dining_alerts(8_000)[0];
        assert_eq!(
            alert.to_string(),
            "Budget for 'Dining' warning: spent 80.00 of 100.00 (80.0%)"
        );
    }
}
