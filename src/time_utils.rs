/// Conversions between 12-hour and 24-hour clock strings.
///
/// These helpers work on raw strings as typed or stored, so they never
/// fail: input that cannot be understood is handed back unchanged and
/// callers must not assume a well-formed result.

use crate::models::TimeOfDay;

/// First bookable minute of the day (09:00).
pub const OPENING_MINUTES: u32 = 9 * 60;
/// Last bookable minute of the day (20:00).
pub const CLOSING_MINUTES: u32 = 20 * 60;
/// Spacing of the selectable times.
pub const OPTION_STEP_MINUTES: u32 = 30;

/// Convert `HH:MM` to `h:MM AM/PM`. Unparseable input is returned as is.
pub fn to_12_hour(time24: &str) -> String {
    match time24.trim().parse::<TimeOfDay>() {
        Ok(time) => time.to_12_hour(),
        Err(_) => time24.to_string(),
    }
}

/// Convert `h:MM AM/PM` (any case) to `HH:MM`.
///
/// A string with no AM/PM marker passes through unchanged, as does
/// anything that cannot be parsed.
pub fn to_24_hour(time12: &str) -> String {
    parse_12_hour(time12)
        .map(|time| time.to_string())
        .unwrap_or_else(|| time12.to_string())
}

fn parse_12_hour(value: &str) -> Option<TimeOfDay> {
    let trimmed = value.trim();
    let upper = trimmed.to_uppercase();
    let (clock, is_pm) = if let Some(rest) = upper.strip_suffix("AM") {
        (rest, false)
    } else if let Some(rest) = upper.strip_suffix("PM") {
        (rest, true)
    } else {
        return None;
    };

    let (hours, minutes) = clock.trim().split_once(':')?;
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return None;
    }
    let hour: u32 = hours.parse().ok()?;
    let minute: u32 = minutes.parse().ok()?;
    if !(1..=12).contains(&hour) {
        return None;
    }

    let hour = match (hour, is_pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    };
    TimeOfDay::new(hour, minute)
}

/// Parse either clock format into a time.
pub fn parse_any(value: &str) -> Option<TimeOfDay> {
    to_24_hour(value).trim().parse().ok()
}

/// Hours between two times, as a non-negative decimal.
///
/// Malformed or inverted input yields `0.0`.
pub fn duration_hours(start: &str, end: &str) -> f64 {
    match (parse_any(start), parse_any(end)) {
        (Some(start), Some(end)) if end > start => {
            f64::from(end.minutes_since_midnight() - start.minutes_since_midnight()) / 60.0
        }
        _ => 0.0,
    }
}

/// Strict `HH:MM` check.
pub fn is_valid_time(value: &str) -> bool {
    value.parse::<TimeOfDay>().is_ok()
}

/// Whether a time falls within the clinic's opening hours, inclusive.
pub fn within_business_hours(time: TimeOfDay) -> bool {
    (OPENING_MINUTES..=CLOSING_MINUTES).contains(&time.minutes_since_midnight())
}

/// Business-hour times, 9:00 AM through 8:00 PM, every 30 minutes.
pub fn business_hour_options() -> Vec<String> {
    business_hour_times()
        .into_iter()
        .map(|time| time.to_12_hour())
        .collect()
}

pub(crate) fn business_hour_times() -> Vec<TimeOfDay> {
    (OPENING_MINUTES..=CLOSING_MINUTES)
        .step_by(OPTION_STEP_MINUTES as usize)
        .filter_map(TimeOfDay::from_minutes)
        .collect()
}
