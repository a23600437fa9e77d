/// Weekly schedule state for the doctor portal.
///
/// `ScheduleManager` owns the committed week and at most one open edit
/// session. Per-day commits stay local until `save_week` sends the whole
/// week to the backend; deleting an already persisted slot is the one edit
/// that goes to the backend immediately.

use std::collections::BTreeSet;

use chrono::{NaiveDate, Weekday};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{RemoteFailure, ScheduleError, ValidationFailure};
use crate::models::{
    weekday_key, DaySchedule, PersistedId, SlotKind, TimeOfDay, TimeSlot, WeeklySchedule,
};
use crate::rules;
use crate::store::ScheduleStore;
use crate::time_utils;
use crate::week::{week_window, WeekNavigator};

/// A slot as typed in the editor, with times in 12-hour display form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSlot {
    pub key: Uuid,
    pub start_time: String,
    pub end_time: String,
    pub kind: SlotKind,
    pub id: Option<PersistedId>,
}

impl DraftSlot {
    pub fn available(start_time: &str, end_time: &str) -> Self {
        DraftSlot {
            key: Uuid::new_v4(),
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            kind: SlotKind::Available,
            id: None,
        }
    }

    pub fn day_off() -> Self {
        DraftSlot {
            kind: SlotKind::DayOff,
            ..DraftSlot::available("", "")
        }
    }

    /// Snapshot a committed slot for editing.
    pub fn from_committed(slot: &TimeSlot) -> Self {
        DraftSlot {
            key: Uuid::new_v4(),
            start_time: slot.start_time.map(|t| t.to_12_hour()).unwrap_or_default(),
            end_time: slot.end_time.map(|t| t.to_12_hour()).unwrap_or_default(),
            kind: slot.kind,
            id: slot.id.clone(),
        }
    }

    /// Convert to storage form. Only called on validated drafts.
    fn to_committed(&self) -> Result<TimeSlot, ValidationFailure> {
        let slot = match self.kind {
            SlotKind::DayOff => TimeSlot::day_off(),
            SlotKind::Available => {
                let start = time_utils::parse_any(&self.start_time)
                    .ok_or(ValidationFailure::OutsideBusinessHours)?;
                let end = time_utils::parse_any(&self.end_time)
                    .ok_or(ValidationFailure::OutsideBusinessHours)?;
                TimeSlot::available(start, end)?
            }
        };
        Ok(match &self.id {
            Some(id) => slot.with_id(id.clone()),
            None => slot,
        })
    }
}

/// Field of a draft slot the editor can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotField {
    StartTime,
    EndTime,
    Kind,
}

/// The single day currently open for editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub day: Weekday,
    pub date: NaiveDate,
    pub slots: Vec<DraftSlot>,
}

impl EditSession {
    fn position(&self, key: Uuid) -> Result<usize, ScheduleError> {
        self.slots
            .iter()
            .position(|slot| slot.key == key)
            .ok_or(ScheduleError::SlotNotFound)
    }
}

/// Owns a doctor's week and mediates edits against the backend.
pub struct ScheduleManager<S: ScheduleStore, C: Clock> {
    store: S,
    clock: C,
    navigator: WeekNavigator,
    schedule: WeeklySchedule,
    session: Option<EditSession>,
    unsaved: BTreeSet<u32>,
    load_error: Option<RemoteFailure>,
}

impl<S: ScheduleStore, C: Clock> ScheduleManager<S, C> {
    /// Create a manager viewing the current week. Nothing is loaded yet.
    pub fn new(store: S, clock: C) -> Self {
        let today = clock.now().date();
        ScheduleManager {
            store,
            clock,
            navigator: WeekNavigator::new(today),
            schedule: WeeklySchedule::empty(),
            session: None,
            unsaved: BTreeSet::new(),
            load_error: None,
        }
    }

    pub fn schedule(&self) -> &WeeklySchedule {
        &self.schedule
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn navigator(&self) -> &WeekNavigator {
        &self.navigator
    }

    pub fn week_start(&self) -> NaiveDate {
        self.navigator.week_start()
    }

    pub fn total_hours(&self) -> f64 {
        self.schedule.total_hours()
    }

    /// The failure from the last load, kept for display until the next load.
    pub fn load_error(&self) -> Option<&RemoteFailure> {
        self.load_error.as_ref()
    }

    /// Whether a day holds committed edits not yet sent to the backend.
    pub fn is_unsaved(&self, day: Weekday) -> bool {
        self.unsaved.contains(&day.num_days_from_monday())
    }

    pub fn has_unsaved_changes(&self) -> bool {
        !self.unsaved.is_empty()
    }

    /// Calendar date of a weekday in the viewed week.
    pub fn date_of(&self, day: Weekday) -> NaiveDate {
        week_window(self.week_start())[day.num_days_from_monday() as usize]
    }

    /// Whether a weekday of the viewed week can still be edited.
    pub fn is_editable(&self, day: Weekday) -> bool {
        rules::ensure_editable(self.date_of(day), self.clock.now()).is_ok()
    }

    /// Load the week starting on `week_start` from the backend.
    ///
    /// On failure the week falls back to empty and the failure is both
    /// returned and kept in `load_error`. Any open session and pending
    /// local edits are discarded.
    pub fn load_week(&mut self, week_start: NaiveDate) -> Result<&WeeklySchedule, RemoteFailure> {
        self.navigator = WeekNavigator::new(week_start);
        let week_start = self.navigator.week_start();
        self.session = None;
        self.unsaved.clear();

        match self.store.fetch_week(week_start) {
            Ok(schedule) => {
                info!(%week_start, total_hours = schedule.total_hours(), "loaded week schedule");
                self.schedule = schedule;
                self.load_error = None;
                Ok(&self.schedule)
            }
            Err(error) => {
                warn!(%week_start, %error, "failed to load week schedule, showing empty week");
                self.schedule = WeeklySchedule::empty();
                self.load_error = Some(error.clone());
                Err(error)
            }
        }
    }

    /// Move the view by whole weeks and load that week.
    ///
    /// A shift past the supported calendar range keeps the current week.
    pub fn show_week(&mut self, delta_weeks: i64) -> Result<&WeeklySchedule, RemoteFailure> {
        let mut navigator = self.navigator;
        if !navigator.shift(delta_weeks) {
            warn!(delta_weeks, "week navigation out of range");
            return Ok(&self.schedule);
        }
        self.load_week(navigator.reference())
    }

    /// Jump back to the week containing today and load it.
    pub fn show_current_week(&mut self) -> Result<&WeeklySchedule, RemoteFailure> {
        let today = self.clock.now().date();
        self.load_week(today)
    }

    /// Open one weekday for editing, replacing any open session.
    pub fn open_day_for_edit(&mut self, day: Weekday) -> Result<&EditSession, ScheduleError> {
        let date = self.date_of(day);
        rules::ensure_editable(date, self.clock.now())?;

        if let Some(previous) = &self.session {
            debug!(day = weekday_key(previous.day), "discarding open edit session");
        }

        let slots = self
            .schedule
            .day(day)
            .slots()
            .iter()
            .map(DraftSlot::from_committed)
            .collect();
        info!(day = weekday_key(day), %date, "opened day for editing");

        Ok(&*self.session.insert(EditSession { day, date, slots }))
    }

    /// Start times still selectable for the open day.
    pub fn start_options(&self) -> Vec<TimeOfDay> {
        match &self.session {
            Some(session) => rules::start_options(session.date, self.clock.now()),
            None => Vec::new(),
        }
    }

    fn session_mut(&mut self) -> Result<&mut EditSession, ScheduleError> {
        self.session.as_mut().ok_or(ScheduleError::NoOpenSession)
    }

    /// Append a slot starting at the first time still open for the day.
    ///
    /// When no time is left the slot is added with blank times and will
    /// fail validation on commit.
    pub fn add_draft_slot(&mut self) -> Result<Uuid, ScheduleError> {
        let now = self.clock.now();
        let session = self.session_mut()?;

        let start = rules::start_options(session.date, now).first().copied();
        let end = start.and_then(|s| rules::end_options(s).first().copied());
        let display = |time: Option<TimeOfDay>| time.map(|t| t.to_12_hour()).unwrap_or_default();

        let slot = DraftSlot::available(&display(start), &display(end));
        let key = slot.key;
        session.slots.push(slot);
        Ok(key)
    }

    /// Change one field of a draft slot. Nothing is validated until commit.
    pub fn update_draft_slot(
        &mut self,
        key: Uuid,
        field: SlotField,
        value: &str,
    ) -> Result<(), ScheduleError> {
        let session = self.session_mut()?;
        let index = session.position(key)?;
        let slot = &mut session.slots[index];

        match field {
            SlotField::StartTime => slot.start_time = value.to_string(),
            SlotField::EndTime => slot.end_time = value.to_string(),
            SlotField::Kind => slot.kind = SlotKind::infer(value),
        }
        Ok(())
    }

    /// Remove a draft slot.
    ///
    /// A slot the backend already knows is deleted there first, scoped to
    /// the viewed week, and that weekday is replaced with the backend's
    /// answer. On failure nothing changes locally.
    pub fn remove_draft_slot(&mut self, key: Uuid) -> Result<(), ScheduleError> {
        let week_start = self.week_start();
        let session = self.session.as_ref().ok_or(ScheduleError::NoOpenSession)?;
        let index = session.position(key)?;
        let day = session.day;

        let Some(id) = session.slots[index].id.clone() else {
            self.session_mut()?.slots.remove(index);
            return Ok(());
        };

        match self.store.delete_slot(week_start, day, &id) {
            Ok(returned) => {
                info!(day = weekday_key(day), slot = %id, "deleted persisted slot");
                // Other days keep their local commits until `save_week`.
                self.schedule.set_day(day, returned.day(day).clone());
                self.unsaved.remove(&day.num_days_from_monday());
                self.session_mut()?.slots.remove(index);
                Ok(())
            }
            Err(error) => {
                warn!(day = weekday_key(day), slot = %id, %error, "failed to delete slot");
                Err(error.into())
            }
        }
    }

    /// Replace the draft with a single day-off slot.
    pub fn mark_day_off(&mut self) -> Result<(), ScheduleError> {
        let session = self.session_mut()?;
        session.slots = vec![DraftSlot::day_off()];
        Ok(())
    }

    /// Validate the draft and merge it into the committed week.
    ///
    /// Local only; the day is flagged unsaved until `save_week`. On a
    /// validation failure the session stays open and the week is unchanged.
    pub fn commit_day(&mut self) -> Result<&WeeklySchedule, ScheduleError> {
        let now = self.clock.now();
        let session = self.session.as_ref().ok_or(ScheduleError::NoOpenSession)?;

        if let Err(failure) = rules::validate_day(&session.slots, session.date, now) {
            debug!(day = weekday_key(session.day), %failure, "draft rejected");
            return Err(failure.into());
        }

        let slots = session
            .slots
            .iter()
            .map(DraftSlot::to_committed)
            .collect::<Result<Vec<_>, _>>()?;
        let day = session.day;

        self.schedule.set_day(day, DaySchedule::new(slots));
        self.unsaved.insert(day.num_days_from_monday());
        self.session = None;
        info!(
            day = weekday_key(day),
            total_hours = self.schedule.total_hours(),
            "committed day locally"
        );
        Ok(&self.schedule)
    }

    /// Discard the open session, if any.
    pub fn cancel_edit(&mut self) {
        if let Some(session) = self.session.take() {
            debug!(day = weekday_key(session.day), "edit cancelled");
        }
    }

    /// Send the whole committed week to the backend for the viewed week.
    pub fn save_week(&mut self) -> Result<&WeeklySchedule, ScheduleError> {
        let week_start = self.week_start();

        match self.store.save_week(week_start, &self.schedule) {
            Ok(schedule) => {
                info!(%week_start, total_hours = schedule.total_hours(), "saved week schedule");
                self.schedule = schedule;
                self.unsaved.clear();
                Ok(&self.schedule)
            }
            Err(error) => {
                warn!(%week_start, %error, "failed to save week schedule");
                Err(error.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::WEEKDAYS;
    use chrono::NaiveDateTime;

    /// Records calls and answers from a scripted backend week.
    #[derive(Default)]
    struct RecordingStore {
        week: WeeklySchedule,
        fail_with: Option<RemoteFailure>,
        fetches: Vec<NaiveDate>,
        saves: Vec<(NaiveDate, WeeklySchedule)>,
        deletes: Vec<(NaiveDate, Weekday, PersistedId)>,
        next_id: u32,
    }

    impl RecordingStore {
        fn check(&self) -> Result<(), RemoteFailure> {
            match &self.fail_with {
                Some(error) => Err(error.clone()),
                None => Ok(()),
            }
        }
    }

    impl ScheduleStore for RecordingStore {
        fn fetch_week(&mut self, week_start: NaiveDate) -> Result<WeeklySchedule, RemoteFailure> {
            self.fetches.push(week_start);
            self.check()?;
            Ok(self.week.clone())
        }

        fn save_week(
            &mut self,
            week_start: NaiveDate,
            schedule: &WeeklySchedule,
        ) -> Result<WeeklySchedule, RemoteFailure> {
            self.saves.push((week_start, schedule.clone()));
            self.check()?;

            let mut stored = WeeklySchedule::empty();
            for (day, slots) in schedule.days() {
                let slots = slots
                    .slots()
                    .iter()
                    .cloned()
                    .map(|slot| match slot.id {
                        Some(_) => slot,
                        None => {
                            self.next_id += 1;
                            slot.with_id(PersistedId(format!("id-{}", self.next_id)))
                        }
                    })
                    .collect();
                stored.set_day(day, DaySchedule::new(slots));
            }
            self.week = stored.clone();
            Ok(stored)
        }

        fn delete_slot(
            &mut self,
            week_start: NaiveDate,
            day: Weekday,
            id: &PersistedId,
        ) -> Result<WeeklySchedule, RemoteFailure> {
            self.deletes.push((week_start, day, id.clone()));
            self.check()?;

            let remaining = self
                .week
                .day(day)
                .slots()
                .iter()
                .filter(|slot| slot.id.as_ref() != Some(id))
                .cloned()
                .collect();
            self.week.set_day(day, DaySchedule::new(remaining));
            Ok(self.week.clone())
        }
    }

    // Sunday 2026-10-18 belongs to the week of Monday 2026-10-12.
    fn at(month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn t(value: &str) -> TimeOfDay {
        value.parse().unwrap()
    }

    fn persisted(start: &str, end: &str, id: &str) -> TimeSlot {
        TimeSlot::available(t(start), t(end))
            .unwrap()
            .with_id(PersistedId(id.to_string()))
    }

    /// A manager on Wednesday 2026-10-21 at the given time, viewing that week.
    fn manager_at(
        hour: u32,
        minute: u32,
        store: RecordingStore,
    ) -> ScheduleManager<RecordingStore, FixedClock> {
        let mut manager = ScheduleManager::new(store, FixedClock(at(10, 21, hour, minute)));
        manager.load_week(monday()).unwrap();
        manager
    }

    #[test]
    fn load_week_anchors_on_monday() {
        let mut manager = ScheduleManager::new(RecordingStore::default(), FixedClock(at(10, 21, 9, 0)));
        manager.load_week(NaiveDate::from_ymd_opt(2026, 10, 23).unwrap()).unwrap();
        assert_eq!(manager.week_start(), monday());
        assert_eq!(manager.store.fetches, vec![monday()]);
    }

    #[test]
    fn load_failure_falls_back_to_empty_week() {
        let mut store = RecordingStore::default();
        store.week.set_day(Weekday::Mon, DaySchedule::new(vec![persisted("09:00", "10:00", "a")]));
        store.fail_with = Some(RemoteFailure::Network("connection refused".to_string()));

        let mut manager = ScheduleManager::new(store, FixedClock(at(10, 21, 9, 0)));
        let result = manager.load_week(monday());

        assert_eq!(result.err(), Some(RemoteFailure::Network("connection refused".to_string())));
        assert_eq!(manager.schedule(), &WeeklySchedule::empty());
        assert!(manager.load_error().is_some());
        assert_eq!(manager.store.fetches.len(), 1);
    }

    #[test]
    fn open_day_respects_editability() {
        let mut manager = manager_at(16, 0, RecordingStore::default());
        assert_eq!(
            manager.open_day_for_edit(Weekday::Tue).err(),
            Some(ScheduleError::Validation(ValidationFailure::NotEditable))
        );
        assert!(manager.open_day_for_edit(Weekday::Wed).is_ok());
        assert!(manager.open_day_for_edit(Weekday::Fri).is_ok());
        assert_eq!(manager.session().map(|s| s.day), Some(Weekday::Fri));

        let mut late = manager_at(17, 5, RecordingStore::default());
        assert_eq!(
            late.open_day_for_edit(Weekday::Wed).err(),
            Some(ScheduleError::Validation(ValidationFailure::NotEditable))
        );
        assert!(late.open_day_for_edit(Weekday::Thu).is_ok());
    }

    #[test]
    fn open_day_snapshots_slots_in_display_form() {
        let mut store = RecordingStore::default();
        store.week.set_day(Weekday::Thu, DaySchedule::new(vec![persisted("13:00", "15:30", "x")]));
        let mut manager = manager_at(9, 0, store);

        let session = manager.open_day_for_edit(Weekday::Thu).unwrap();
        assert_eq!(session.date, NaiveDate::from_ymd_opt(2026, 10, 22).unwrap());
        assert_eq!(session.slots[0].start_time, "1:00 PM");
        assert_eq!(session.slots[0].end_time, "3:30 PM");
        assert_eq!(session.slots[0].id, Some(PersistedId("x".to_string())));
    }

    #[test]
    fn add_draft_slot_defaults_to_first_open_time() {
        let mut manager = manager_at(10, 10, RecordingStore::default());

        manager.open_day_for_edit(Weekday::Wed).unwrap();
        manager.add_draft_slot().unwrap();
        let slot = &manager.session().unwrap().slots[0];
        assert_eq!((slot.start_time.as_str(), slot.end_time.as_str()), ("10:30 AM", "11:00 AM"));

        manager.open_day_for_edit(Weekday::Thu).unwrap();
        manager.add_draft_slot().unwrap();
        let slot = &manager.session().unwrap().slots[0];
        assert_eq!((slot.start_time.as_str(), slot.end_time.as_str()), ("9:00 AM", "9:30 AM"));
    }

    #[test]
    fn add_draft_slot_on_sunday_inserts_placeholder() {
        let mut manager = manager_at(9, 0, RecordingStore::default());
        manager.open_day_for_edit(Weekday::Sun).unwrap();
        manager.add_draft_slot().unwrap();

        let slot = &manager.session().unwrap().slots[0];
        assert!(slot.start_time.is_empty() && slot.end_time.is_empty());
        assert_eq!(
            manager.commit_day().err(),
            Some(ScheduleError::Validation(ValidationFailure::MissingField))
        );
        assert!(manager.session().is_some());
    }

    #[test]
    fn commit_day_sums_hours() {
        let mut manager = manager_at(9, 0, RecordingStore::default());
        manager.load_week(NaiveDate::from_ymd_opt(2026, 10, 26).unwrap()).unwrap();
        manager.open_day_for_edit(Weekday::Mon).unwrap();

        for (start, end) in [("9:00 AM", "11:00 AM"), ("12:00 PM", "2:00 PM"), ("3:00 PM", "5:00 PM")] {
            let key = manager.add_draft_slot().unwrap();
            manager.update_draft_slot(key, SlotField::StartTime, start).unwrap();
            manager.update_draft_slot(key, SlotField::EndTime, end).unwrap();
        }

        let week = manager.commit_day().unwrap();
        assert_eq!(week.total_hours(), 6.0);
        assert_eq!(week.day(Weekday::Mon).slots()[1].start_time, Some(t("12:00")));
        assert!(manager.session().is_none());
        assert!(manager.is_unsaved(Weekday::Mon));
        assert!(manager.store.saves.is_empty());
    }

    #[test]
    fn failed_commit_keeps_session_and_week() {
        let mut store = RecordingStore::default();
        store.week.set_day(Weekday::Fri, DaySchedule::new(vec![persisted("09:00", "10:00", "f")]));
        let mut manager = manager_at(9, 0, store);
        let before = manager.schedule().clone();

        manager.open_day_for_edit(Weekday::Fri).unwrap();
        let key = manager.add_draft_slot().unwrap();
        manager.update_draft_slot(key, SlotField::StartTime, "2:00 PM").unwrap();
        manager.update_draft_slot(key, SlotField::EndTime, "1:00 PM").unwrap();

        assert_eq!(
            manager.commit_day().err(),
            Some(ScheduleError::Validation(ValidationFailure::InvertedInterval))
        );
        assert_eq!(manager.schedule(), &before);
        assert_eq!(manager.session().unwrap().slots.len(), 2);
        assert!(!manager.has_unsaved_changes());
    }

    #[test]
    fn mark_day_off_replaces_draft() {
        let mut manager = manager_at(9, 0, RecordingStore::default());
        manager.open_day_for_edit(Weekday::Sat).unwrap();
        manager.add_draft_slot().unwrap();
        manager.add_draft_slot().unwrap();
        manager.mark_day_off().unwrap();

        assert_eq!(manager.session().unwrap().slots.len(), 1);
        let week = manager.commit_day().unwrap();
        assert!(week.day(Weekday::Sat).is_day_off());
        assert_eq!(week.total_hours(), 0.0);
    }

    #[test]
    fn update_kind_infers_day_off() {
        let mut manager = manager_at(9, 0, RecordingStore::default());
        manager.open_day_for_edit(Weekday::Sun).unwrap();
        let key = manager.add_draft_slot().unwrap();
        manager.update_draft_slot(key, SlotField::Kind, "Day Off").unwrap();

        assert!(manager.commit_day().unwrap().day(Weekday::Sun).is_day_off());
    }

    #[test]
    fn removing_local_slot_never_calls_backend() {
        let mut manager = manager_at(9, 0, RecordingStore::default());
        manager.open_day_for_edit(Weekday::Thu).unwrap();
        let key = manager.add_draft_slot().unwrap();
        manager.remove_draft_slot(key).unwrap();

        assert!(manager.session().unwrap().slots.is_empty());
        assert!(manager.store.deletes.is_empty());
        assert_eq!(manager.remove_draft_slot(key), Err(ScheduleError::SlotNotFound));
    }

    #[test]
    fn removing_persisted_slot_deletes_remotely() {
        let mut store = RecordingStore::default();
        store.week.set_day(
            Weekday::Thu,
            DaySchedule::new(vec![persisted("09:00", "10:00", "a"), persisted("11:00", "12:00", "b")]),
        );
        let mut manager = manager_at(9, 0, store);

        // A local commit on Thursday, then remove a persisted slot from it.
        manager.open_day_for_edit(Weekday::Thu).unwrap();
        manager.commit_day().unwrap();
        assert!(manager.is_unsaved(Weekday::Thu));

        manager.open_day_for_edit(Weekday::Thu).unwrap();
        let key = manager.session().unwrap().slots[0].key;
        manager.remove_draft_slot(key).unwrap();

        assert_eq!(
            manager.store.deletes,
            vec![(monday(), Weekday::Thu, PersistedId("a".to_string()))]
        );
        assert_eq!(manager.schedule().day(Weekday::Thu).slots().len(), 1);
        assert_eq!(manager.total_hours(), 1.0);
        assert!(!manager.is_unsaved(Weekday::Thu));
        assert_eq!(manager.session().unwrap().slots.len(), 1);
    }

    #[test]
    fn failed_delete_changes_nothing() {
        let mut store = RecordingStore::default();
        store.week.set_day(Weekday::Thu, DaySchedule::new(vec![persisted("09:00", "10:00", "a")]));
        let mut manager = manager_at(9, 0, store);
        manager.open_day_for_edit(Weekday::Thu).unwrap();
        manager.store.fail_with = Some(RemoteFailure::AuthExpired);

        let key = manager.session().unwrap().slots[0].key;
        let error = manager.remove_draft_slot(key).unwrap_err();

        assert!(error.is_auth_expired());
        assert_eq!(manager.session().unwrap().slots.len(), 1);
        assert_eq!(manager.schedule().day(Weekday::Thu).slots().len(), 1);
    }

    #[test]
    fn deleting_persisted_slot_keeps_other_unsaved_days() {
        let mut store = RecordingStore::default();
        store.week.set_day(
            Weekday::Thu,
            DaySchedule::new(vec![persisted("09:00", "10:00", "a"), persisted("11:00", "12:00", "b")]),
        );
        let mut manager = manager_at(9, 0, store);

        manager.open_day_for_edit(Weekday::Wed).unwrap();
        let key = manager.add_draft_slot().unwrap();
        manager.update_draft_slot(key, SlotField::StartTime, "1:00 PM").unwrap();
        manager.update_draft_slot(key, SlotField::EndTime, "3:00 PM").unwrap();
        manager.commit_day().unwrap();

        manager.open_day_for_edit(Weekday::Thu).unwrap();
        let key = manager.session().unwrap().slots[0].key;
        manager.remove_draft_slot(key).unwrap();

        assert_eq!(manager.schedule().day(Weekday::Wed).slots().len(), 1);
        assert!(manager.is_unsaved(Weekday::Wed));
        assert!(!manager.is_unsaved(Weekday::Thu));
        assert_eq!(manager.schedule().day(Weekday::Thu).slots().len(), 1);
        assert_eq!(manager.total_hours(), 3.0);

        manager.cancel_edit();
        manager.save_week().unwrap();
        let (_, saved) = &manager.store.saves[0];
        assert_eq!(saved.day(Weekday::Wed).slots().len(), 1);
        assert_eq!(saved.day(Weekday::Thu).slots().len(), 1);
    }

    #[test]
    fn save_week_targets_viewed_week() {
        let mut manager = manager_at(9, 0, RecordingStore::default());
        manager.show_week(2).unwrap();
        manager.open_day_for_edit(Weekday::Tue).unwrap();
        manager.add_draft_slot().unwrap();
        manager.commit_day().unwrap();

        manager.save_week().unwrap();

        let next_next = NaiveDate::from_ymd_opt(2026, 11, 2).unwrap();
        assert_eq!(manager.store.saves.len(), 1);
        assert_eq!(manager.store.saves[0].0, next_next);
        assert!(!manager.has_unsaved_changes());
        assert!(manager.schedule().day(Weekday::Tue).slots()[0].is_persisted());
    }

    #[test]
    fn failed_save_keeps_local_edits() {
        let mut manager = manager_at(9, 0, RecordingStore::default());
        manager.open_day_for_edit(Weekday::Thu).unwrap();
        manager.add_draft_slot().unwrap();
        let committed = manager.commit_day().unwrap().clone();

        manager.store.fail_with = Some(RemoteFailure::Server {
            status: 500,
            message: "boom".to_string(),
        });
        assert!(manager.save_week().is_err());
        assert_eq!(manager.schedule(), &committed);
        assert!(manager.is_unsaved(Weekday::Thu));
    }

    #[test]
    fn out_of_range_navigation_keeps_the_week() {
        let mut manager = manager_at(9, 0, RecordingStore::default());
        manager.show_week(i64::MAX).unwrap();
        manager.show_week(-20_000_000).unwrap();

        assert_eq!(manager.week_start(), monday());
        assert_eq!(manager.store.fetches, vec![monday()]);
    }

    #[test]
    fn cancel_edit_discards_draft() {
        let mut manager = manager_at(9, 0, RecordingStore::default());
        manager.open_day_for_edit(Weekday::Thu).unwrap();
        manager.add_draft_slot().unwrap();
        manager.cancel_edit();

        assert!(manager.session().is_none());
        assert_eq!(manager.schedule(), &WeeklySchedule::empty());
        assert_eq!(manager.add_draft_slot(), Err(ScheduleError::NoOpenSession));
    }

    #[test]
    fn editability_by_weekday() {
        let manager = manager_at(9, 0, RecordingStore::default());
        let editable: Vec<bool> = WEEKDAYS.iter().map(|d| manager.is_editable(*d)).collect();
        assert_eq!(editable, vec![false, false, true, true, true, true, true]);
    }
}
