use std::{
    collections::HashMap,
    sync::Mutex,
};

use async_trait::async_trait;

use super::*;
use crate::{
    Error, Result,
    calendar::RemoteEvent,
    event_id::generate_event_id,
    types::ScheduleType,
};

/// In-memory calendar double recording every call.
#[derive(Default)]
struct FakeCalendar {
    events: Mutex<HashMap<String, RemoteEvent>>,
    fetch_calls: Mutex<usize>,
    insert_calls: Mutex<usize>,
    replace_calls: Mutex<usize>,
    last_payload: Mutex<Option<EventPayload>>,
    fail_fetch: bool,
    conflict_on_insert: bool,
    reject_insert: Option<(u16, String)>,
}

impl FakeCalendar {
    fn with_event(self, id: &str, status: &str) -> Self {
        self.events.lock().unwrap().insert(
            id.to_string(),
            RemoteEvent {
                id: id.to_string(),
                summary: Some("existing".to_string()),
                status: Some(status.to_string()),
            },
        );
        self
    }

    fn inserts(&self) -> usize {
        *self.insert_calls.lock().unwrap()
    }

    fn replaces(&self) -> usize {
        *self.replace_calls.lock().unwrap()
    }
}

#[async_trait]
impl RemoteCalendarClient for &FakeCalendar {
    async fn fetch_event(
        &self,
        _token: &str,
        _calendar_id: &str,
        event_id: &str,
    ) -> Result<Option<RemoteEvent>> {
        *self.fetch_calls.lock().unwrap() += 1;
        if self.fail_fetch {
            return Err(Error::Internal("existence check exploded".to_string()));
        }
        Ok(self.events.lock().unwrap().get(event_id).cloned())
    }

    async fn insert_event(
        &self,
        _token: &str,
        _calendar_id: &str,
        payload: &EventPayload,
    ) -> Result<WriteOutcome> {
        *self.insert_calls.lock().unwrap() += 1;
        *self.last_payload.lock().unwrap() = Some(payload.clone());
        if let Some((status, message)) = &self.reject_insert {
            return Ok(WriteOutcome::Rejected {
                status: *status,
                message: message.clone(),
            });
        }
        if self.conflict_on_insert {
            return Ok(WriteOutcome::Conflict {
                message: "The requested identifier already exists".to_string(),
            });
        }
        let event = RemoteEvent {
            id: payload.id.clone(),
            summary: Some(payload.summary.clone()),
            status: Some("confirmed".to_string()),
        };
        self.events
            .lock()
            .unwrap()
            .insert(payload.id.clone(), event.clone());
        Ok(WriteOutcome::Written(event))
    }

    async fn replace_event(
        &self,
        _token: &str,
        _calendar_id: &str,
        event_id: &str,
        payload: &EventPayload,
    ) -> Result<WriteOutcome> {
        *self.replace_calls.lock().unwrap() += 1;
        let event = RemoteEvent {
            id: event_id.to_string(),
            summary: Some(payload.summary.clone()),
            status: Some("confirmed".to_string()),
        };
        self.events
            .lock()
            .unwrap()
            .insert(event_id.to_string(), event.clone());
        Ok(WriteOutcome::Written(event))
    }
}

fn entry() -> ScheduleEntry {
    ScheduleEntry {
        subject: "CS".to_string(),
        course: "180".to_string(),
        schedule_type: ScheduleType::Lecture,
        name: "CS 180 Lec".to_string(),
        crn: "12345".to_string(),
        availability: "10".to_string(),
        days: "MWF".to_string(),
        start_time: "9:30a".to_string(),
        end_time: "10:20a".to_string(),
        date_range: "08/22 - 12/10".to_string(),
        room: "LWSN B155".to_string(),
        instructor: "Dunsmore".to_string(),
        requires: String::new(),
        credits: "3".to_string(),
        grade_mode: "Letter".to_string(),
    }
}

#[tokio::test]
async fn repeated_sync_is_idempotent() {
    let calendar = FakeCalendar::default();
    let engine = SyncEngine::new(&calendar);
    let entries = vec![entry()];

    let first = engine.synchronize(&entries, "tok").await;
    assert_eq!(first.len(), 1);
    assert!(first[0].success && !first[0].skipped);
    assert_eq!(calendar.inserts(), 1);

    let second = engine.synchronize(&entries, "tok").await;
    assert!(second[0].success && second[0].skipped);
    // No create call was issued on the second run.
    assert_eq!(calendar.inserts(), 1);
    assert_eq!(calendar.replaces(), 0);
}

#[tokio::test]
async fn conflict_triggers_exactly_one_update() {
    let calendar = FakeCalendar {
        conflict_on_insert: true,
        ..FakeCalendar::default()
    };
    let engine = SyncEngine::new(&calendar);

    let results = engine.synchronize(&[entry()], "tok").await;
    assert!(results[0].success);
    assert!(results[0].updated);
    assert!(!results[0].skipped);
    assert_eq!(calendar.inserts(), 1);
    assert_eq!(calendar.replaces(), 1);
}

#[tokio::test]
async fn cancelled_remote_event_counts_as_absent() {
    let target = entry();
    let calendar =
        FakeCalendar::default().with_event(&generate_event_id(&target), "cancelled");
    let engine = SyncEngine::new(&calendar);

    let results = engine.synchronize(&[target], "tok").await;
    assert!(results[0].success && !results[0].skipped);
    assert_eq!(calendar.inserts(), 1);
}

#[tokio::test]
async fn live_remote_event_is_skipped_without_write() {
    let target = entry();
    let calendar =
        FakeCalendar::default().with_event(&generate_event_id(&target), "confirmed");
    let engine = SyncEngine::new(&calendar);

    let results = engine.synchronize(&[target], "tok").await;
    assert!(results[0].success && results[0].skipped);
    assert_eq!(calendar.inserts(), 0);
}

#[tokio::test]
async fn failed_existence_check_is_optimistic_by_default() {
    let calendar = FakeCalendar {
        fail_fetch: true,
        ..FakeCalendar::default()
    };
    let engine = SyncEngine::new(&calendar);

    let results = engine.synchronize(&[entry()], "tok").await;
    assert!(results[0].success);
    assert_eq!(calendar.inserts(), 1);
}

#[tokio::test]
async fn strict_policy_fails_entry_on_check_error() {
    let calendar = FakeCalendar {
        fail_fetch: true,
        ..FakeCalendar::default()
    };
    let engine = SyncEngine::new(&calendar).with_policy(ExistenceCheckPolicy::Strict);

    let results = engine.synchronize(&[entry()], "tok").await;
    assert!(!results[0].success);
    assert_eq!(calendar.inserts(), 0);
}

#[tokio::test]
async fn parse_failure_is_isolated_and_touches_nothing_remote() {
    let calendar = FakeCalendar::default();
    let engine = SyncEngine::new(&calendar);

    let mut broken = entry();
    broken.start_time = "nine-ish".to_string();
    let entries = vec![broken, entry()];

    let results = engine.synchronize(&entries, "tok").await;
    assert_eq!(results.len(), 2);
    assert!(!results[0].success);
    assert!(results[0].error.as_deref().unwrap().contains("nine-ish"));
    // Only the healthy entry reached the remote service.
    assert!(results[1].success);
    assert_eq!(calendar.inserts(), 1);
}

#[tokio::test]
async fn rejected_create_records_failure() {
    let calendar = FakeCalendar {
        reject_insert: Some((403, "insufficient permission".to_string())),
        ..FakeCalendar::default()
    };
    let engine = SyncEngine::new(&calendar);

    let results = engine.synchronize(&[entry()], "tok").await;
    assert!(!results[0].success);
    let error = results[0].error.as_deref().unwrap();
    assert!(error.contains("403"));
    assert!(error.contains("permission"));
    assert!(results[0].friendly_error().contains("permissions"));
    assert_eq!(calendar.replaces(), 0);
}

#[tokio::test]
async fn payload_carries_identity_times_and_recurrence() {
    let calendar = FakeCalendar::default();
    let engine = SyncEngine::new(&calendar).with_time_zone("America/Indiana/Indianapolis");
    let target = entry();
    let expected_id = generate_event_id(&target);

    let results = engine.synchronize(&[target], "tok").await;
    assert_eq!(results[0].event_id.as_deref(), Some(expected_id.as_str()));

    let events = calendar.events.lock().unwrap();
    assert!(events.contains_key(&expected_id));

    let payload = calendar.last_payload.lock().unwrap().clone().unwrap();
    assert_eq!(payload.id, expected_id);
    assert_eq!(payload.summary, "CS 180 Lec");
    assert_eq!(payload.location, "LWSN B155");
    assert!(payload.start.date_time.ends_with("T09:30:00"));
    assert!(payload.end.date_time.ends_with("T10:20:00"));
    assert_eq!(payload.start.time_zone, "America/Indiana/Indianapolis");
    assert_eq!(payload.recurrence.len(), 1);
    assert!(payload.recurrence[0].starts_with("RRULE:FREQ=WEEKLY;BYDAY=MO,WE,FR;UNTIL="));
    assert!(payload.recurrence[0].ends_with("T235959Z"));
}

#[tokio::test]
async fn report_aggregates_counts() {
    let calendar = FakeCalendar::default();
    let engine = SyncEngine::new(&calendar);

    let mut broken = entry();
    broken.date_range = "TBA".to_string();
    let entries = vec![entry(), broken];

    let report = engine.synchronize_report(&entries, "tok").await;
    assert_eq!((report.added, report.skipped, report.failed), (1, 0, 1));
    assert_eq!(report.status(), crate::types::SyncStatus::Partial);
}
