use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::money::Money;

/// One transaction extracted from a single line of a dated document.
///
/// Records are never edited after parsing. `is_backfill` is derived from
/// the two dates rather than stored, so it cannot drift from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    /// Economic date: an explicit date written on the line, else `source_date`.
    pub date: NaiveDate,
    /// Date implied by the containing document's name.
    pub source_date: NaiveDate,
    pub keyword: String,
    pub category: String,
    /// Always positive.
    pub amount: Money,
    pub is_income: bool,
    pub description: String,
    pub raw_text: String,
}

impl TransactionRecord {
    pub fn is_backfill(&self) -> bool {
        self.date != self.source_date
    }

    pub fn is_expense(&self) -> bool {
        !self.is_income
    }
}

impl Serialize for TransactionRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("TransactionRecord", 9)?;
        s.serialize_field("date", &self.date)?;
        s.serialize_field("source_date", &self.source_date)?;
        s.serialize_field("keyword", &self.keyword)?;
        s.serialize_field("category", &self.category)?;
        s.serialize_field("amount", &self.amount)?;
        s.serialize_field("is_income", &self.is_income)?;
        s.serialize_field("description", &self.description)?;
        s.serialize_field("raw_text", &self.raw_text)?;
        s.serialize_field("is_backfill", &self.is_backfill())?;
        s.end()
    }
}
