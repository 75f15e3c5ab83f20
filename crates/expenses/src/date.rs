//! `DD-MM-YYYY` dates with calendar rollover.

use chrono::{Datelike, Duration, NaiveDate};

/// Parse a `DD-MM-YYYY` date.
///
/// Returns `None` for an empty string, a string that does not split into
/// exactly three `-`-separated parts, or parts that are not integers. A
/// blank part counts as 0. Out-of-range days and months are not rejected:
/// they roll over into the neighbouring month or year (`31-02-2024` is
/// 2 March 2024, `00-01-2024` is 31 December 2023). Years 0 to 99 are read
/// as 1900 to 1999.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    if raw.is_empty() {
        return None;
    }
    let parts: Vec<&str> = raw.split('-').collect();
    let [day, month, year] = parts.as_slice() else {
        return None;
    };
    let day = date_part(day)?;
    let month = date_part(month)?;
    let mut year = date_part(year)?;
    if (0..=99).contains(&year) {
        year += 1900;
    }
    normalize(year, month, day)
}

fn date_part(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(0);
    }
    raw.parse().ok()
}

fn normalize(year: i64, month: i64, day: i64) -> Option<NaiveDate> {
    let months = year.checked_mul(12)?.checked_add(month.checked_sub(1)?)?;
    let y = i32::try_from(months.div_euclid(12)).ok()?;
    let m = u32::try_from(months.rem_euclid(12) + 1).ok()?;
    let first = NaiveDate::from_ymd_opt(y, m, 1)?;
    first.checked_add_signed(Duration::try_days(day.checked_sub(1)?)?)
}

/// Monday-first weekday index (Monday = 0 .. Sunday = 6).
pub fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}

/// Zero-based month index (January = 0).
pub fn month_index(date: NaiveDate) -> usize {
    date.month0() as usize
}
