//! Calendar-date rules: not-in-the-future and minimum age

use chrono::{Datelike, NaiveDate};

/// Accepted date format (`YYYY-MM-DD`, no time component)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a calendar date, ignoring surrounding whitespace
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Empty is valid; otherwise the date must be on or before `today`.
/// Unparseable input is invalid.
pub fn is_not_future(value: &str, today: NaiveDate) -> bool {
    if value.is_empty() {
        return true;
    }
    parse_date(value).is_some_and(|date| date <= today)
}

/// Whole years between `birth` and `today`, counting a year only once the
/// birthday (month, day) has been reached.
pub fn calendar_age(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Empty is valid; otherwise the calendar age must be at least `min_years`.
/// Unparseable input is invalid, as is any date against a threshold no
/// calendar age can reach.
pub fn meets_minimum_age(value: &str, min_years: u32, today: NaiveDate) -> bool {
    if value.is_empty() {
        return true;
    }
    let Ok(min_years) = i32::try_from(min_years) else {
        return false;
    };
    parse_date(value).is_some_and(|birth| calendar_age(birth, today) >= min_years)
}
