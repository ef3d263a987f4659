//! Conversions between "H:MM" text and whole minutes.
//!
//! Block times, credit values and time away from base are all stored as
//! minutes and entered or exported as hours and minutes.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Sentinel returned when asked to display a negative duration.
pub const INVALID_TIME: &str = "Invalid time";

const MINUTES_PER_HOUR: u32 = 60;
const MINUTES_PER_DAY: i64 = 60 * 24;

static HOURS_MINUTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,3}):(\d{2})$").expect("valid duration pattern"));

/// Parse an "H:MM" string into minutes.
///
/// Hours may have one to three digits, minutes exactly two. Surrounding
/// whitespace is ignored.
///
/// # Errors
///
/// Returns [`Error::Format`] if the text does not match the pattern.
pub fn to_minutes(text: &str) -> Result<u32> {
    let caps = HOURS_MINUTES
        .captures(text.trim())
        .ok_or_else(|| Error::format("duration", text))?;

    let hours: u32 = caps[1].parse().map_err(|_| Error::format("duration", text))?;
    let minutes: u32 = caps[2].parse().map_err(|_| Error::format("duration", text))?;

    Ok(hours * MINUTES_PER_HOUR + minutes)
}

/// Format minutes as "H:MM".
///
/// Negative input yields [`INVALID_TIME`] instead of failing.
#[must_use]
pub fn to_display(minutes: i64) -> String {
    if minutes < 0 {
        return INVALID_TIME.to_string();
    }

    format!("{}:{:02}", minutes / 60, minutes % 60)
}

/// Format minutes as "D days, H hours, M minutes".
#[must_use]
pub fn to_days_text(minutes: i64) -> String {
    if minutes < 0 {
        return INVALID_TIME.to_string();
    }

    let days = minutes / MINUTES_PER_DAY;
    let rest = minutes % MINUTES_PER_DAY;

    format!("{days} days, {} hours, {} minutes", rest / 60, rest % 60)
}
