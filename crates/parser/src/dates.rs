use chrono::NaiveDate;
use std::ops::Range;
use std::path::Path;

re!(re_date_token, r"[0-9]{4}-[0-9]{2}-[0-9]{2}");

/// `YYYY-MM-DD` tokens that are not glued to further digits on either side.
fn date_tokens(text: &str) -> impl Iterator<Item = regex::Match<'_>> {
    re_date_token().find_iter(text).filter(move |m| {
        let before = text[..m.start()].chars().next_back();
        let after = text[m.end()..].chars().next();
        !before.is_some_and(|c| c.is_ascii_digit()) && !after.is_some_and(|c| c.is_ascii_digit())
    })
}

fn parse_token(token: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(token, "%Y-%m-%d").ok()
}

fn stem(identity: &str) -> &str {
    Path::new(identity)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(identity)
}

/// First date token in `text` that is a real calendar date, with its byte span.
pub fn find_date(text: &str) -> Option<(Range<usize>, NaiveDate)> {
    date_tokens(text).find_map(|m| parse_token(m.as_str()).map(|d| (m.range(), d)))
}

/// Strict naming convention for daily documents: the name (without
/// extension) holds exactly one date token and ends with it.
pub fn dated_identity(identity: &str) -> Option<NaiveDate> {
    let stem = stem(identity);
    let mut tokens = date_tokens(stem);
    let token = tokens.next()?;
    if tokens.next().is_some() || token.end() != stem.len() {
        return None;
    }
    parse_token(token.as_str())
}

/// Lenient date for a document of any name: the last valid date token in it.
pub fn context_date(identity: &str) -> Option<NaiveDate> {
    date_tokens(stem(identity))
        .filter_map(|m| parse_token(m.as_str()))
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn find_date_returns_span() {
        let text = "dinner 2024-03-01 with friends";
        let (span, date) = find_date(text).unwrap();
        assert_eq!(&text[span], "2024-03-01");
        assert_eq!(date, d(2024, 3, 1));
    }

    #[test]
    fn find_date_skips_invalid_calendar_dates() {
        let (_, date) = find_date("2024-02-30 then 2024-02-29").unwrap();
        assert_eq!(date, d(2024, 2, 29));
        assert_eq!(find_date("2024-13-40"), None);
    }

    #[test]
    fn find_date_ignores_tokens_inside_longer_numbers() {
        assert_eq!(find_date("ref 12024-03-011"), None);
    }

    #[test]
    fn find_date_allows_adjacent_cjk_text() {
        let (_, date) = find_date("补记2024-03-01午饭").unwrap();
        assert_eq!(date, d(2024, 3, 1));
    }

    #[test]
    fn dated_identity_accepts_daily_names() {
        assert_eq!(dated_identity("2024-03-10.md"), Some(d(2024, 3, 10)));
        assert_eq!(dated_identity("Journal 2024-03-10.md"), Some(d(2024, 3, 10)));
        assert_eq!(dated_identity("2024-03-10"), Some(d(2024, 3, 10)));
    }

    #[test]
    fn dated_identity_rejects_other_names() {
        assert_eq!(dated_identity("2024-03-10 recap.md"), None);
        assert_eq!(dated_identity("2024-03-01 to 2024-03-10.md"), None);
        assert_eq!(dated_identity("ideas.md"), None);
        assert_eq!(dated_identity("2024-02-30.md"), None);
    }

    #[test]
    fn context_date_is_lenient() {
        assert_eq!(context_date("2024-03-10 recap.md"), Some(d(2024, 3, 10)));
        assert_eq!(context_date("2024-03-01 to 2024-03-10.md"), Some(d(2024, 3, 10)));
        assert_eq!(context_date("ideas.md"), None);
    }
}
