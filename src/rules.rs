/// Clinic business rules for schedule edits.
///
/// All checks are pure functions of the candidate slot, the calendar date
/// it belongs to and the current wall-clock time.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};

use crate::error::ValidationFailure;
use crate::models::{SlotKind, TimeOfDay};
use crate::schedule::DraftSlot;
use crate::time_utils::{self, business_hour_times};

/// Same-day edits close at 5 PM.
pub const EDIT_CUTOFF_HOUR: u32 = 17;
/// Minimum lead time for a same-day start.
pub const START_BUFFER_MINUTES: u32 = 5;

/// Check that a day can be opened for editing at all.
///
/// Past days are locked, and today is locked from 5 PM onwards.
pub fn ensure_editable(date: NaiveDate, now: NaiveDateTime) -> Result<(), ValidationFailure> {
    let today = now.date();
    if date < today {
        return Err(ValidationFailure::NotEditable);
    }
    if date == today && now.hour() >= EDIT_CUTOFF_HOUR {
        return Err(ValidationFailure::NotEditable);
    }
    Ok(())
}

/// Latest start time that is still too soon for a same-day slot.
///
/// Now plus the buffer, truncated to the 5-minute grid; a start must be
/// strictly after it. `None` once the cutoff passes midnight.
pub fn same_day_cutoff(now: NaiveDateTime) -> Option<TimeOfDay> {
    let threshold = now.hour() * 60 + now.minute() + START_BUFFER_MINUTES;
    TimeOfDay::from_minutes(threshold - threshold % START_BUFFER_MINUTES)
}

fn starts_too_soon(start: TimeOfDay, now: NaiveDateTime) -> bool {
    match same_day_cutoff(now) {
        Some(cutoff) => start <= cutoff,
        None => true,
    }
}

/// Validate one draft slot for the given date. First failure wins.
pub fn validate_slot(
    slot: &DraftSlot,
    date: NaiveDate,
    now: NaiveDateTime,
) -> Result<(), ValidationFailure> {
    if slot.kind == SlotKind::DayOff {
        return Ok(());
    }

    if slot.start_time.trim().is_empty() || slot.end_time.trim().is_empty() {
        return Err(ValidationFailure::MissingField);
    }

    if date.weekday() == Weekday::Sun {
        return Err(ValidationFailure::ClosedDay);
    }

    let start = time_utils::parse_any(&slot.start_time);
    let end = time_utils::parse_any(&slot.end_time);
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        // Text that is not a time cannot be inside opening hours either.
        _ => return Err(ValidationFailure::OutsideBusinessHours),
    };

    if !time_utils::within_business_hours(start) || !time_utils::within_business_hours(end) {
        return Err(ValidationFailure::OutsideBusinessHours);
    }

    if start >= end {
        return Err(ValidationFailure::InvertedInterval);
    }

    // Only the start is checked against the clock.
    if date == now.date() && starts_too_soon(start, now) {
        return Err(ValidationFailure::PastStartTime);
    }

    Ok(())
}

/// Validate a whole day's draft: editability first, then every slot.
pub fn validate_day(
    slots: &[DraftSlot],
    date: NaiveDate,
    now: NaiveDateTime,
) -> Result<(), ValidationFailure> {
    ensure_editable(date, now)?;
    for slot in slots {
        validate_slot(slot, date, now)?;
    }
    Ok(())
}

/// Start times still selectable for a date.
pub fn start_options(date: NaiveDate, now: NaiveDateTime) -> Vec<TimeOfDay> {
    if date.weekday() == Weekday::Sun || date < now.date() {
        return Vec::new();
    }

    let times = business_hour_times();
    if date > now.date() {
        return times;
    }
    times
        .into_iter()
        .filter(|time| !starts_too_soon(*time, now))
        .collect()
}

/// End times selectable after a given start.
pub fn end_options(start: TimeOfDay) -> Vec<TimeOfDay> {
    business_hour_times()
        .into_iter()
        .filter(|time| *time > start)
        .collect()
}
