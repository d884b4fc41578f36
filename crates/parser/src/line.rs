use chrono::NaiveDate;
use jotledger_core::{CategoryDictionary, LedgerConfig, Money, TransactionRecord};
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::dates::find_date;

/// Currency words that may trail an amount. Matched longest-first.
pub const CURRENCY_UNITS: &[&str] = &["dollars", "yuan", "RMB", "rmb", "CNY", "USD", "usd", "元", "块"];

re!(re_amount, r"[0-9]+(?:\.[0-9]+)?");

/// Regex alternation of every dictionary keyword, escaped, longest first.
pub fn keyword_alternation(dictionary: &CategoryDictionary) -> String {
    dictionary
        .keywords()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|")
}

/// Turns single text lines into transaction records.
///
/// A line is a transaction when it contains the marker immediately
/// followed (whitespace allowed) by a known keyword and then an amount:
///
/// ```text
/// #cy 38.5元 lunch 2024-03-01
/// ```
///
/// Anything else is declined with `None`; parsing never fails.
#[derive(Debug, Clone)]
pub struct RecordParser {
    dictionary: CategoryDictionary,
    income_keyword: String,
    marker: String,
    /// `None` when the dictionary is empty: nothing can match.
    line_pattern: Option<Regex>,
}

impl RecordParser {
    pub fn new(config: &LedgerConfig) -> Self {
        Self::with_dictionary(
            &config.marker,
            &config.income_keyword,
            CategoryDictionary::from_config(config),
        )
    }

    pub fn with_dictionary(marker: &str, income_keyword: &str, dictionary: CategoryDictionary) -> Self {
        let line_pattern = if dictionary.is_empty() {
            None
        } else {
            let pattern = format!(
                r"{}\s*(?P<keyword>{})\s*(?P<rest>.*)",
                regex::escape(marker),
                keyword_alternation(&dictionary)
            );
            Regex::new(&pattern).ok()
        };

        Self {
            dictionary,
            income_keyword: income_keyword.to_string(),
            marker: marker.to_string(),
            line_pattern,
        }
    }

    pub fn dictionary(&self) -> &CategoryDictionary {
        &self.dictionary
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Parses one line written on `context_date`.
    pub fn parse(&self, line: &str, context_date: NaiveDate) -> Option<TransactionRecord> {
        if !line.contains(self.marker.as_str()) {
            return None;
        }

        let caps = self.line_pattern.as_ref()?.captures(line)?;
        let keyword = caps.name("keyword")?.as_str();
        let rest = caps.name("rest").map_or("", |m| m.as_str());

        // An explicit date is lifted out first so its digits never read as the amount.
        let (text, date) = match find_date(rest) {
            Some((span, date)) => (format!("{} {}", &rest[..span.start], &rest[span.end..]), date),
            None => (rest.to_string(), context_date),
        };

        let amount_match = re_amount().find(&text)?;
        let amount = Money::new(Decimal::from_str(amount_match.as_str()).ok()?);
        if !amount.is_positive() {
            return None;
        }

        let after_amount = strip_unit(&text[amount_match.end()..]);
        let description = collapse_whitespace(&format!("{} {}", &text[..amount_match.start()], after_amount));

        Some(TransactionRecord {
            date,
            source_date: context_date,
            keyword: keyword.to_string(),
            category: self.dictionary.resolve(keyword).to_string(),
            amount,
            is_income: keyword == self.income_keyword,
            description,
            raw_text: line.trim_end_matches(['\r', '\n']).to_string(),
        })
    }

    /// Parses every line of a document; lines are independent of each other.
    pub fn parse_document(&self, content: &str, context_date: NaiveDate) -> Vec<TransactionRecord> {
        content
            .lines()
            .filter_map(|line| self.parse(line, context_date))
            .collect()
    }
}

/// Drops one currency unit directly after an amount, if present.
fn strip_unit(text: &str) -> &str {
    let trimmed = text.trim_start();
    let mut units: Vec<&str> = CURRENCY_UNITS.to_vec();
    units.sort_by_key(|u| std::cmp::Reverse(u.chars().count()));

    for unit in units {
        let Some(after) = trimmed.strip_prefix(unit) else {
            continue;
        };
        // ASCII units must end on a word boundary: "50 usdt" keeps its text.
        let needs_boundary = unit.chars().last().is_some_and(|c| c.is_ascii_alphanumeric());
        let at_boundary = !after.chars().next().is_some_and(|c| c.is_ascii_alphanumeric());
        if !needs_boundary || at_boundary {
            return after;
        }
    }
    text
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
