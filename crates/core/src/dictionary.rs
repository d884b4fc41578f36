use serde::Serialize;

use crate::config::LedgerConfig;

/// Display name for a keyword the dictionary does not know.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Display name given to the income keyword when the mapping omits it.
pub const DEFAULT_INCOME_CATEGORY: &str = "Income";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryEntry {
    pub keyword: String,
    pub category: String,
}

/// Keyword → category mapping kept in match order: longest keyword first,
/// so a keyword is always tried before any shorter keyword that prefixes it.
#[derive(Debug, Clone, Default)]
pub struct CategoryDictionary {
    entries: Vec<CategoryEntry>,
}

impl CategoryDictionary {
    pub fn new<I, K, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, C)>,
        K: Into<String>,
        C: Into<String>,
    {
        let mut entries: Vec<CategoryEntry> = pairs
            .into_iter()
            .map(|(k, c)| CategoryEntry { keyword: k.into(), category: c.into() })
            .filter(|e| !e.keyword.is_empty())
            .collect();
        // Longest first; ties alphabetical so the order is deterministic.
        entries.sort_by(|a, b| {
            b.keyword
                .chars()
                .count()
                .cmp(&a.keyword.chars().count())
                .then_with(|| a.keyword.cmp(&b.keyword))
        });
        entries.dedup_by(|a, b| a.keyword == b.keyword);
        Self { entries }
    }

    /// Builds the dictionary from configuration. The income keyword is
    /// always present, even when the category mapping leaves it out.
    pub fn from_config(config: &LedgerConfig) -> Self {
        let mut pairs: Vec<(String, String)> = config
            .categories
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if !config.categories.contains_key(&config.income_keyword) {
            pairs.push((config.income_keyword.clone(), DEFAULT_INCOME_CATEGORY.to_string()));
        }
        Self::new(pairs)
    }

    pub fn category_for(&self, keyword: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.keyword == keyword)
            .map(|e| e.category.as_str())
    }

    /// Like `category_for`, falling back to `UNCATEGORIZED`.
    pub fn resolve(&self, keyword: &str) -> &str {
        self.category_for(keyword).unwrap_or(UNCATEGORIZED)
    }

    /// Keywords in match order (longest first).
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.keyword.as_str())
    }

    pub fn entries(&self) -> &[CategoryEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
