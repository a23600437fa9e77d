//! Doctor weekly schedule editor for the clinic management system.
//!
//! The engine validates slot edits against clinic hours, keeps a week of
//! slots in memory with one day open for editing at a time, and persists
//! the week through a REST backend.

pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod rules;
pub mod schedule;
pub mod store;
pub mod time_utils;
pub mod week;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ConfigError, RemoteFailure, ScheduleError, ValidationFailure};
pub use models::{DaySchedule, PersistedId, SlotKind, TimeOfDay, TimeSlot, WeeklySchedule};
pub use schedule::{DraftSlot, EditSession, ScheduleManager, SlotField};
pub use store::{CredentialProvider, HttpScheduleStore, ScheduleStore, StaticToken};
pub use week::WeekNavigator;
