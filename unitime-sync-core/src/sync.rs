//! The existence-check/create/update synchronization protocol.

use crate::{
    calendar::{EventPayload, EventTime, RemoteCalendarClient, WriteOutcome},
    recurrence::{self, WeeklyRule},
    timecode,
    types::{PreparedEntry, ScheduleEntry, SyncReport, SyncResult},
};

/// Default target calendar.
pub const DEFAULT_CALENDAR_ID: &str = "primary";

/// Institution time zone used for event times.
pub const DEFAULT_TIME_ZONE: &str = "America/Indiana/Indianapolis";

/// How an existence-check failure is treated.
///
/// The permissive default is a deliberate policy: a transient read failure
/// should not block the whole batch, so the engine proceeds to attempt
/// creation and lets the conflict path recover if the event did exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExistenceCheckPolicy {
    /// Treat a failed check as "event absent" and attempt creation.
    #[default]
    OptimisticOnError,
    /// Fail the entry when the check fails.
    Strict,
}

/// Synchronizes schedule entries into the remote calendar, one at a time.
///
/// Processing is deliberately sequential: the service rate-limits per
/// credential, and the conflict-then-update fallback assumes no other write
/// to the same identifier is in flight from this batch.
pub struct SyncEngine<C> {
    client: C,
    calendar_id: String,
    time_zone: String,
    policy: ExistenceCheckPolicy,
}

impl<C: RemoteCalendarClient> SyncEngine<C> {
    /// Engine with the default calendar, time zone and check policy.
    pub fn new(client: C) -> Self {
        Self {
            client,
            calendar_id: DEFAULT_CALENDAR_ID.to_string(),
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            policy: ExistenceCheckPolicy::default(),
        }
    }

    /// Targets a different calendar.
    pub fn with_calendar_id(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = calendar_id.into();
        self
    }

    /// Uses a different event time zone.
    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = time_zone.into();
        self
    }

    /// Overrides the existence-check policy.
    pub fn with_policy(mut self, policy: ExistenceCheckPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Synchronizes every entry, continuing past per-entry failures.
    pub async fn synchronize(&self, entries: &[ScheduleEntry], token: &str) -> Vec<SyncResult> {
        let mut results = Vec::with_capacity(entries.len());
        for entry in entries {
            results.push(self.sync_entry(entry, token).await);
        }
        results
    }

    /// Synchronizes and aggregates into a report.
    pub async fn synchronize_report(&self, entries: &[ScheduleEntry], token: &str) -> SyncReport {
        SyncReport::from_results(self.synchronize(entries, token).await)
    }

    async fn sync_entry(&self, entry: &ScheduleEntry, token: &str) -> SyncResult {
        let summary = entry.summary();

        // Parse failures are local: report them, touch nothing remote.
        let prepared = match entry.prepare() {
            Ok(prepared) => prepared,
            Err(e) => {
                tracing::warn!(entry = %summary, error = %e, "skipping unsynchronizable entry");
                return SyncResult::failure(summary, e.to_string());
            }
        };
        let event_id = prepared.event_id.clone();
        tracing::debug!(entry = %summary, %event_id, "computed event identity");

        match self
            .client
            .fetch_event(token, &self.calendar_id, &event_id)
            .await
        {
            Ok(Some(existing)) if !existing.is_cancelled() => {
                tracing::info!(entry = %summary, %event_id, "event already exists, skipping");
                return SyncResult::skipped(summary, event_id);
            }
            // 404 and cancelled both mean "not existing".
            Ok(_) => {}
            Err(e) => match self.policy {
                ExistenceCheckPolicy::OptimisticOnError => {
                    tracing::warn!(entry = %summary, error = %e,
                        "existence check failed, assuming absent");
                }
                ExistenceCheckPolicy::Strict => {
                    return SyncResult::failure(summary, e.to_string());
                }
            },
        }

        let payload = self.build_payload(&prepared, event_id.clone());
        match self
            .client
            .insert_event(token, &self.calendar_id, &payload)
            .await
        {
            Ok(WriteOutcome::Written(event)) => {
                tracing::info!(entry = %summary, event_id = %event.id, "event created");
                SyncResult::added(summary, event.id)
            }
            Ok(WriteOutcome::Conflict { .. }) => {
                // Identifier taken since the check, e.g. a prior partial run.
                // One replace attempt; its failure is terminal for the entry.
                tracing::info!(entry = %summary, %event_id, "identity conflict, updating");
                match self
                    .client
                    .replace_event(token, &self.calendar_id, &event_id, &payload)
                    .await
                {
                    Ok(WriteOutcome::Written(event)) => SyncResult::updated(summary, event.id),
                    Ok(WriteOutcome::Conflict { message })
                    | Ok(WriteOutcome::Rejected { message, .. }) => {
                        SyncResult::failure(summary, message)
                    }
                    Err(e) => SyncResult::failure(summary, e.to_string()),
                }
            }
            Ok(WriteOutcome::Rejected { status, message }) => {
                tracing::warn!(entry = %summary, status, "event creation rejected");
                SyncResult::failure(summary, format!("HTTP {status}: {message}"))
            }
            Err(e) => SyncResult::failure(summary, e.to_string()),
        }
    }

    fn build_payload(&self, prepared: &PreparedEntry<'_>, event_id: String) -> EventPayload {
        let first =
            recurrence::first_occurrence_on_or_after(prepared.range.start, &prepared.entry.days);
        let rule = WeeklyRule::new(&prepared.entry.days, prepared.range.end);
        EventPayload {
            id: event_id,
            summary: prepared.entry.summary(),
            location: prepared.entry.room.clone(),
            start: EventTime {
                date_time: timecode::local_date_time(first, prepared.start),
                time_zone: self.time_zone.clone(),
            },
            end: EventTime {
                date_time: timecode::local_date_time(first, prepared.end),
                time_zone: self.time_zone.clone(),
            },
            recurrence: vec![rule.to_wire_rrule()],
        }
    }
}

#[cfg(test)]
mod tests;
