/// Data models for the weekly schedule editor.
///
/// This module defines the core data structures used throughout the engine:
/// - TimeOfDay: a wall-clock time within a day
/// - SlotKind: whether a slot is bookable or a day off
/// - TimeSlot: one committed interval within a day
/// - DaySchedule: the ordered slots of one weekday
/// - WeeklySchedule: the seven days of a doctor's week

use chrono::Weekday;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationFailure;
use crate::time_utils;

/// Weekdays in display order, Monday first.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Lowercase weekday name used as a schedule key.
pub fn weekday_key(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Parse a weekday key, case-insensitive.
pub fn weekday_from_key(value: &str) -> Option<Weekday> {
    WEEKDAYS
        .iter()
        .copied()
        .find(|day| weekday_key(*day).eq_ignore_ascii_case(value.trim()))
}

/// A wall-clock time with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u32,
    minute: u32,
}

impl TimeOfDay {
    /// Create a time, rejecting out-of-range components.
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(TimeOfDay { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Minutes elapsed since midnight.
    pub fn minutes_since_midnight(&self) -> u32 {
        self.hour * 60 + self.minute
    }

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        Self::new(minutes / 60, minutes % 60)
    }

    /// Format as `h:MM AM/PM`.
    pub fn to_12_hour(&self) -> String {
        let (display_hour, meridiem) = match self.hour {
            0 => (12, "AM"),
            1..=11 => (self.hour, "AM"),
            12 => (12, "PM"),
            _ => (self.hour - 12, "PM"),
        };
        format!("{}:{:02} {}", display_hour, self.minute, meridiem)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = String;

    /// Parse strict 24-hour `HH:MM`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("Invalid time: '{}'. Expected HH:MM", value);

        let (hours, minutes) = value.split_once(':').ok_or_else(invalid)?;
        if hours.len() != 2 || minutes.len() != 2 {
            return Err(invalid());
        }
        if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let hour: u32 = hours.parse().map_err(|_| invalid())?;
        let minute: u32 = minutes.parse().map_err(|_| invalid())?;
        TimeOfDay::new(hour, minute).ok_or_else(invalid)
    }
}

/// Whether a slot can be booked or blocks the whole day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    Available,
    DayOff,
}

impl SlotKind {
    /// Infer the kind from a free-text slot type.
    ///
    /// Anything that reads as a day off is `DayOff`; every other label,
    /// including empty, is `Available`.
    pub fn infer(label: &str) -> Self {
        let normalized: String = label
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "dayoff" | "off" => SlotKind::DayOff,
            _ => SlotKind::Available,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SlotKind::Available => "Available",
            SlotKind::DayOff => "Day Off",
        }
    }
}

/// Backend-assigned identity of a persisted slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PersistedId(pub String);

impl PersistedId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersistedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One committed interval within a day.
///
/// Day-off slots carry no times; available slots always carry both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlot {
    pub start_time: Option<TimeOfDay>,
    pub end_time: Option<TimeOfDay>,
    pub kind: SlotKind,
    pub id: Option<PersistedId>,
}

impl TimeSlot {
    /// Create an available slot with validation.
    pub fn available(start_time: TimeOfDay, end_time: TimeOfDay) -> Result<Self, ValidationFailure> {
        if !time_utils::within_business_hours(start_time)
            || !time_utils::within_business_hours(end_time)
        {
            return Err(ValidationFailure::OutsideBusinessHours);
        }
        if end_time <= start_time {
            return Err(ValidationFailure::InvertedInterval);
        }

        Ok(TimeSlot {
            start_time: Some(start_time),
            end_time: Some(end_time),
            kind: SlotKind::Available,
            id: None,
        })
    }

    /// Create a slot blocking the whole day.
    pub fn day_off() -> Self {
        TimeSlot {
            start_time: None,
            end_time: None,
            kind: SlotKind::DayOff,
            id: None,
        }
    }

    pub fn with_id(mut self, id: PersistedId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Bookable hours in this slot. Day-off slots count for nothing.
    pub fn hours(&self) -> f64 {
        match (self.kind, self.start_time, self.end_time) {
            (SlotKind::Available, Some(start), Some(end)) if end > start => {
                f64::from(end.minutes_since_midnight() - start.minutes_since_midnight()) / 60.0
            }
            _ => 0.0,
        }
    }
}

/// The ordered slots of one weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaySchedule {
    slots: Vec<TimeSlot>,
}

impl DaySchedule {
    pub fn new(slots: Vec<TimeSlot>) -> Self {
        DaySchedule { slots }
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_day_off(&self) -> bool {
        self.slots.iter().any(|slot| slot.kind == SlotKind::DayOff)
    }

    pub fn hours(&self) -> f64 {
        self.slots.iter().map(TimeSlot::hours).sum()
    }
}

/// A doctor's week: one `DaySchedule` per weekday.
///
/// Total hours are always derived from the slots, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklySchedule {
    days: [DaySchedule; 7],
}

impl WeeklySchedule {
    /// An all-empty week.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn day(&self, day: Weekday) -> &DaySchedule {
        &self.days[day.num_days_from_monday() as usize]
    }

    /// Replace one weekday's slots.
    pub fn set_day(&mut self, day: Weekday, schedule: DaySchedule) {
        self.days[day.num_days_from_monday() as usize] = schedule;
    }

    /// Iterate days Monday first.
    pub fn days(&self) -> impl Iterator<Item = (Weekday, &DaySchedule)> {
        WEEKDAYS.iter().copied().zip(self.days.iter())
    }

    /// Sum of available-slot durations, rounded to two decimals.
    pub fn total_hours(&self) -> f64 {
        let raw: f64 = self.days.iter().map(DaySchedule::hours).sum();
        (raw * 100.0).round() / 100.0
    }

    /// Find a slot by its persisted identity.
    pub fn find_slot(&self, id: &PersistedId) -> Option<(Weekday, &TimeSlot)> {
        self.days().find_map(|(day, schedule)| {
            schedule
                .slots()
                .iter()
                .find(|slot| slot.id.as_ref() == Some(id))
                .map(|slot| (day, slot))
        })
    }
}
