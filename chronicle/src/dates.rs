//! Year extraction from free-text dates.
//!
//! Only used for summaries and search filters. Timeline order never parses
//! dates; see [`crate::timeline`].

use std::sync::OnceLock;

use regex::Regex;

fn year_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\b(\d{4})\b").ok())
        .as_ref()
}

/// First standalone four-digit year in `date`.
pub fn extract_year(date: &str) -> Option<i32> {
    let captures = year_pattern()?.captures(date)?;
    captures.get(1)?.as_str().parse().ok()
}

/// Smallest and largest year found across `dates`.
pub fn year_range<'a>(dates: impl IntoIterator<Item = &'a str>) -> Option<(i32, i32)> {
    dates
        .into_iter()
        .filter_map(extract_year)
        .fold(None, |range, year| match range {
            None => Some((year, year)),
            Some((min, max)) => Some((min.min(year), max.max(year))),
        })
}
