/// Monday-anchored week arithmetic for the schedule view.

use chrono::{Datelike, Duration, NaiveDate};

/// The seven dates, Monday through Sunday, of the week containing `date`.
pub fn week_window(date: NaiveDate) -> [NaiveDate; 7] {
    let monday = week_start(date);
    std::array::from_fn(|offset| monday + Duration::days(offset as i64))
}

/// The Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Shift a reference date by whole weeks, in either direction.
///
/// `None` when the result, or any day of its week, falls outside the
/// representable calendar.
pub fn navigate(reference: NaiveDate, delta_weeks: i64) -> Option<NaiveDate> {
    let date = reference.checked_add_signed(Duration::try_weeks(delta_weeks)?)?;
    let monday = date.checked_sub_signed(Duration::days(i64::from(
        date.weekday().num_days_from_monday(),
    )))?;
    monday.checked_add_signed(Duration::days(6))?;
    Some(date)
}

/// Display label such as `Oct 19 – Oct 25, 2026`.
pub fn format_range(window: &[NaiveDate; 7]) -> String {
    format!(
        "{} – {}",
        window[0].format("%b %-d"),
        window[6].format("%b %-d, %Y")
    )
}

/// Holds the week currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekNavigator {
    reference: NaiveDate,
}

impl WeekNavigator {
    pub fn new(reference: NaiveDate) -> Self {
        WeekNavigator { reference }
    }

    pub fn reference(&self) -> NaiveDate {
        self.reference
    }

    pub fn week_start(&self) -> NaiveDate {
        week_start(self.reference)
    }

    pub fn window(&self) -> [NaiveDate; 7] {
        week_window(self.reference)
    }

    pub fn label(&self) -> String {
        format_range(&self.window())
    }

    /// Move by whole weeks. Out-of-range shifts leave the reference alone.
    pub fn shift(&mut self, delta_weeks: i64) -> bool {
        match navigate(self.reference, delta_weeks) {
            Some(reference) => {
                self.reference = reference;
                true
            }
            None => false,
        }
    }
}
