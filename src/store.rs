/// Persistence backend for doctor schedules.
///
/// The schedule manager talks to the backend through `ScheduleStore` so it
/// can be driven by an in-memory fake in tests. `HttpScheduleStore` is the
/// REST implementation used by the CLI.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{NaiveDate, Weekday};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::RemoteFailure;
use crate::models::{
    weekday_from_key, weekday_key, DaySchedule, PersistedId, SlotKind, TimeSlot, WeeklySchedule,
    WEEKDAYS,
};
use crate::time_utils;

/// The three calls the schedule editor needs from the backend.
pub trait ScheduleStore {
    /// Fetch the stored schedule for the week starting on `week_start`.
    fn fetch_week(&mut self, week_start: NaiveDate) -> Result<WeeklySchedule, RemoteFailure>;

    /// Store a whole week and return the backend's authoritative copy.
    fn save_week(
        &mut self,
        week_start: NaiveDate,
        schedule: &WeeklySchedule,
    ) -> Result<WeeklySchedule, RemoteFailure>;

    /// Delete one persisted slot and return the updated week.
    fn delete_slot(
        &mut self,
        week_start: NaiveDate,
        day: Weekday,
        id: &PersistedId,
    ) -> Result<WeeklySchedule, RemoteFailure>;
}

/// Supplies the session token for backend calls.
pub trait CredentialProvider {
    /// The current bearer token, if the user is logged in.
    fn token(&self) -> Option<String>;
}

/// A token fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(pub Option<String>);

impl CredentialProvider for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

// ── Wire format ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSlot {
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

pub type WireWeek = BTreeMap<String, Vec<WireSlot>>;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekPayload {
    #[serde(default)]
    pub weekly_schedule: WireWeek,
    #[serde(default)]
    pub total_hours: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleEnvelope {
    pub schedule: WeekPayload,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveWeekRequest {
    pub week_start_date: String,
    pub weekly_schedule: WireWeek,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Convert a stored slot, inferring its kind when the type is loose.
///
/// Returns `None` for an available slot whose times cannot be read.
pub fn slot_from_wire(wire: &WireSlot) -> Option<TimeSlot> {
    let kind = match wire.kind.as_deref() {
        Some(label) => SlotKind::infer(label),
        None if wire.start_time.trim().is_empty() && wire.end_time.trim().is_empty() => {
            SlotKind::DayOff
        }
        None => SlotKind::Available,
    };

    let slot = match kind {
        SlotKind::DayOff => TimeSlot::day_off(),
        SlotKind::Available => {
            let start = time_utils::parse_any(&wire.start_time)?;
            let end = time_utils::parse_any(&wire.end_time)?;
            TimeSlot::available(start, end).ok()?
        }
    };

    Some(match &wire.id {
        Some(id) => slot.with_id(PersistedId(id.clone())),
        None => slot,
    })
}

pub fn slot_to_wire(slot: &TimeSlot) -> WireSlot {
    WireSlot {
        start_time: slot.start_time.map(|t| t.to_string()).unwrap_or_default(),
        end_time: slot.end_time.map(|t| t.to_string()).unwrap_or_default(),
        kind: Some(slot.kind.name().to_string()),
        id: slot.id.as_ref().map(|id| id.0.clone()),
    }
}

/// Decode a week payload. Unknown days and unreadable slots are dropped.
pub fn week_from_wire(payload: &WeekPayload) -> WeeklySchedule {
    let mut schedule = WeeklySchedule::empty();

    for (key, wire_slots) in &payload.weekly_schedule {
        let Some(day) = weekday_from_key(key) else {
            warn!(day = %key, "ignoring unknown weekday in schedule payload");
            continue;
        };

        let slots = wire_slots
            .iter()
            .filter_map(|wire| {
                let slot = slot_from_wire(wire);
                if slot.is_none() {
                    warn!(day = %key, start = %wire.start_time, end = %wire.end_time, "dropping unreadable slot");
                }
                slot
            })
            .collect();
        schedule.set_day(day, DaySchedule::new(slots));
    }

    if (schedule.total_hours() - payload.total_hours).abs() > 0.01 {
        debug!(
            reported = payload.total_hours,
            computed = schedule.total_hours(),
            "backend total hours differ from slot data"
        );
    }

    schedule
}

/// Encode a week with every weekday present.
pub fn week_to_wire(schedule: &WeeklySchedule) -> WireWeek {
    WEEKDAYS
        .iter()
        .map(|day| {
            let slots = schedule.day(*day).slots().iter().map(slot_to_wire).collect();
            (weekday_key(*day).to_string(), slots)
        })
        .collect()
}

/// Map a non-success HTTP status and body to a failure.
pub fn classify_failure(status: StatusCode, body: &str) -> RemoteFailure {
    if status == StatusCode::UNAUTHORIZED {
        return RemoteFailure::AuthExpired;
    }

    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    RemoteFailure::Server {
        status: status.as_u16(),
        message,
    }
}

// ── HTTP implementation ─────────────────────────────────────────────

/// REST client for the clinic backend's schedule endpoints.
pub struct HttpScheduleStore<P: CredentialProvider> {
    client: Client,
    base_url: Url,
    credentials: P,
}

impl<P: CredentialProvider> HttpScheduleStore<P> {
    pub fn new(base_url: Url, timeout: Duration, credentials: P) -> Result<Self, RemoteFailure> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteFailure::Network(e.to_string()))?;

        Ok(HttpScheduleStore {
            client,
            base_url,
            credentials,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteFailure> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteFailure::Network(format!("invalid base url: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, RemoteFailure> {
        let token = self.credentials.token().ok_or(RemoteFailure::AuthExpired)?;
        Ok(request.bearer_auth(token))
    }

    fn send(&self, request: RequestBuilder) -> Result<WeekPayload, RemoteFailure> {
        let response = self
            .authorized(request)?
            .send()
            .map_err(|e| RemoteFailure::Network(e.to_string()))?;
        read_body(response)
    }
}

fn read_body(response: Response) -> Result<WeekPayload, RemoteFailure> {
    let status = response.status();
    let body = response
        .text()
        .map_err(|e| RemoteFailure::Network(e.to_string()))?;

    if !status.is_success() {
        return Err(classify_failure(status, &body));
    }
    decode_payload(&body)
}

/// Accept either a bare week payload or one wrapped in `schedule`.
pub fn decode_payload(body: &str) -> Result<WeekPayload, RemoteFailure> {
    if let Ok(envelope) = serde_json::from_str::<ScheduleEnvelope>(body) {
        return Ok(envelope.schedule);
    }
    serde_json::from_str::<WeekPayload>(body).map_err(|e| RemoteFailure::Decode(e.to_string()))
}

fn date_param(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl<P: CredentialProvider> ScheduleStore for HttpScheduleStore<P> {
    fn fetch_week(&mut self, week_start: NaiveDate) -> Result<WeeklySchedule, RemoteFailure> {
        let url = self.endpoint(&["doctor", "schedule"])?;
        debug!(%url, %week_start, "fetching week schedule");
        let request = self
            .client
            .get(url)
            .query(&[("weekStartDate", date_param(week_start))]);
        self.send(request).map(|payload| week_from_wire(&payload))
    }

    fn save_week(
        &mut self,
        week_start: NaiveDate,
        schedule: &WeeklySchedule,
    ) -> Result<WeeklySchedule, RemoteFailure> {
        let url = self.endpoint(&["doctor", "schedule"])?;
        debug!(%url, %week_start, "saving week schedule");
        let body = SaveWeekRequest {
            week_start_date: date_param(week_start),
            weekly_schedule: week_to_wire(schedule),
        };
        let request = self.client.put(url).json(&body);
        self.send(request).map(|payload| week_from_wire(&payload))
    }

    fn delete_slot(
        &mut self,
        week_start: NaiveDate,
        day: Weekday,
        id: &PersistedId,
    ) -> Result<WeeklySchedule, RemoteFailure> {
        let url = self.endpoint(&["doctor", "schedule", weekday_key(day), id.as_str()])?;
        debug!(%url, %week_start, "deleting schedule slot");
        let request = self
            .client
            .delete(url)
            .query(&[("weekStartDate", date_param(week_start))]);
        self.send(request).map(|payload| week_from_wire(&payload))
    }
}
