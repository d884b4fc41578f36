// Literal patterns compiled once on first use.
macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static regex::Regex {
            static R: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
            R.get_or_init(|| regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}

pub mod dates;
pub mod line;

pub use dates::{context_date, dated_identity, find_date};
pub use line::{keyword_alternation, RecordParser, CURRENCY_UNITS};
