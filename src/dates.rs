// src/dates.rs

//! Day-code normalization.
//!
//! Every source renders timestamps differently: absolute dates
//! (`2024.05.09`), short dates (`05.09`), or a relative clock time (`14:05`)
//! for same-day posts. This module folds all of them into a canonical
//! zero-padded `MMDD` day code so dates can be compared across sources.
//!
//! Parse failures never escape: anything unrecognizable degrades to the
//! [`NO_MATCH`] sentinel, which compares unequal to every real target day.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, FixedOffset, Timelike};
use regex::Regex;

/// Sentinel day code for unparseable date text. Never equals a real target.
pub const NO_MATCH: &str = "0000";

/// KST, the fixed reference timezone for target-day computation.
pub fn kst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).expect("valid fixed offset")
}

static CLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}):(\d{2})").expect("valid regex"));

/// A two-digit-dot-two-digit (or dash/slash) date fragment. Its presence
/// means the text is a date, even when a colon also appears.
static DATE_GUARD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}[.\-/]\d{2}").expect("valid regex"));

// Year may render as two digits (`24.05.09`) on some listings.
static FULL_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2,4}[.\-/](\d{1,2})[.\-/](\d{1,2})").expect("valid regex"));

static MONTH_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})[.\-/](\d{1,2})").expect("valid regex"));

/// True when the text is a bare clock time with no date fragment.
pub fn is_clock_time(text: &str) -> bool {
    text.contains(':') && !DATE_GUARD.is_match(text)
}

/// Normalize raw timestamp text into an `MMDD` day code.
///
/// Clock times are attributed to the reference day, except when the parsed
/// time-of-day is strictly later than the reference's: a page rendering
/// `23:59` at a reference of `00:05` belongs to the previous calendar day.
pub fn normalize(raw: &str, reference: DateTime<FixedOffset>) -> String {
    let text = raw.trim();

    if is_clock_time(text) {
        if let Some(caps) = CLOCK.captures(text) {
            let hour: u32 = caps[1].parse().unwrap_or(99);
            let minute: u32 = caps[2].parse().unwrap_or(99);
            if hour <= 23 && minute <= 59 {
                let reference_minutes = reference.hour() * 60 + reference.minute();
                let posted_minutes = hour * 60 + minute;
                let day = if posted_minutes > reference_minutes {
                    // Clock rollover near midnight
                    reference.date_naive() - Duration::days(1)
                } else {
                    reference.date_naive()
                };
                return day.format("%m%d").to_string();
            }
        }
        return NO_MATCH.to_string();
    }

    if let Some(caps) = FULL_DATE.captures(text) {
        let month: u32 = caps[1].parse().unwrap_or(0);
        let day: u32 = caps[2].parse().unwrap_or(0);
        return format!("{month:02}{day:02}");
    }

    if let Some(caps) = MONTH_DAY.captures(text) {
        let month: u32 = caps[1].parse().unwrap_or(0);
        let day: u32 = caps[2].parse().unwrap_or(0);
        return format!("{month:02}{day:02}");
    }

    NO_MATCH.to_string()
}
