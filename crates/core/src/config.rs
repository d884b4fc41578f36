use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::money::Money;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Marker symbol must not be empty")]
    EmptyMarker,
    #[error("Income keyword must not be empty")]
    EmptyIncomeKeyword,
    #[error("Category keyword must not be empty (display name '{0}')")]
    EmptyKeyword(String),
    #[error("Alert threshold must be between 0 and 1, got {0}")]
    ThresholdOutOfRange(Decimal),
    #[error("Budget for '{0}' must not be negative")]
    NegativeBudget(String),
}

pub const DEFAULT_MARKER: &str = "#";
pub const DEFAULT_INCOME_KEYWORD: &str = "sr";

pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("cy", "Dining"),
    ("gw", "Shopping"),
    ("jt", "Transport"),
    ("zf", "Housing"),
    ("yl", "Entertainment"),
    ("yy", "Medical"),
    ("xx", "Learning"),
    ("tx", "Phone & Internet"),
    ("qt", "Other"),
    ("sr", "Income"),
];

/// Everything the core reads from the host. Built once and handed over
/// whole; a changed configuration is a new value, never an in-place edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub marker: String,
    pub income_keyword: String,
    /// Keyword → display name.
    pub categories: BTreeMap<String, String>,
    pub budget: BudgetConfig,
    pub corpus: CorpusConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            income_keyword: DEFAULT_INCOME_KEYWORD.to_string(),
            categories: DEFAULT_CATEGORIES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            budget: BudgetConfig::default(),
            corpus: CorpusConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    pub enabled: bool,
    pub monthly_total: Money,
    /// Fraction of a budget (0–1) at which a warning is raised.
    pub alert_threshold: Decimal,
    /// Keyword → budgeted amount. Entries at zero are ignored.
    pub categories: BTreeMap<String, Money>,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            monthly_total: Money::zero(),
            alert_threshold: Decimal::new(8, 1),
            categories: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    pub root: Option<PathBuf>,
    /// File extensions (without the dot) treated as documents.
    pub extensions: Vec<String>,
    pub cache_ttl_secs: u64,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            root: None,
            extensions: vec!["md".to_string(), "txt".to_string()],
            cache_ttl_secs: 300,
        }
    }
}

impl CorpusConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl LedgerConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: LedgerConfig = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.marker.trim().is_empty() {
            return Err(ConfigError::EmptyMarker);
        }
        if self.income_keyword.trim().is_empty() {
            return Err(ConfigError::EmptyIncomeKeyword);
        }
        if let Some((_, name)) = self.categories.iter().find(|(k, _)| k.trim().is_empty()) {
            return Err(ConfigError::EmptyKeyword(name.clone()));
        }

        let threshold = self.budget.alert_threshold;
        if threshold < Decimal::ZERO || threshold > Decimal::ONE {
            return Err(ConfigError::ThresholdOutOfRange(threshold));
        }
        if self.budget.monthly_total < Money::zero() {
            return Err(ConfigError::NegativeBudget("monthly total".to_string()));
        }
        if let Some((keyword, _)) = self
            .budget
            .categories
            .iter()
            .find(|(_, amount)| **amount < Money::zero())
        {
            return Err(ConfigError::NegativeBudget(keyword.clone()));
        }
        Ok(())
    }
}
