//! Field validation for songs and list filters
//!
//! All checks are pure and never fail with an error: malformed input is
//! simply reported as invalid.

use chrono::NaiveDate;
use url::Url;

/// Check a `DD.MM.YYYY` release date.
///
/// Day and month take one or two digits, the year exactly four. The triple
/// must name a real calendar day, so `29.02.2023` is rejected while
/// `29.02.2024` is accepted.
pub fn is_valid_date(s: &str) -> bool {
    parse_date(s).is_some()
}

/// Parse a `DD.MM.YYYY` release date into a calendar date
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split('.').collect();
    let [day, month, year] = parts.as_slice() else {
        return None;
    };

    if !is_digits(day, 1, 2) || !is_digits(month, 1, 2) || !is_digits(year, 4, 4) {
        return None;
    }

    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Check that a link is an absolute URL carrying both a scheme and a host
pub fn is_valid_link(s: &str) -> bool {
    match Url::parse(s) {
        Ok(url) => !url.scheme().is_empty() && url.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

/// Check a year used as a release-date filter: four digits, not in the future
pub fn is_valid_year(s: &str, current_year: i32) -> bool {
    is_digits(s, 4, 4) && s.parse::<i32>().is_ok_and(|year| year <= current_year)
}

fn is_digits(s: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}
