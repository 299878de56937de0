//! Remote calendar client seam.
//!
//! The sync engine talks to the calendar service only through
//! [`RemoteCalendarClient`], so tests substitute a fake and the engine has
//! no direct dependency on the host transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A local datetime paired with an explicit time-zone identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    /// Local-time ISO datetime, no offset.
    pub date_time: String,
    /// IANA time-zone identifier.
    pub time_zone: String,
}

/// Event representation sent to the calendar service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    /// Custom deterministic identifier.
    pub id: String,
    /// Display name.
    pub summary: String,
    /// Meeting room.
    pub location: String,
    /// First occurrence start.
    pub start: EventTime,
    /// First occurrence end.
    pub end: EventTime,
    /// Recurrence rule lines.
    pub recurrence: Vec<String>,
}

/// Event representation read back from the calendar service.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteEvent {
    /// Remote-assigned identifier.
    pub id: String,
    /// Display name, when present.
    #[serde(default)]
    pub summary: Option<String>,
    /// Lifecycle status; "cancelled" events count as absent.
    #[serde(default)]
    pub status: Option<String>,
}

impl RemoteEvent {
    /// Whether the event is in a cancelled state.
    pub fn is_cancelled(&self) -> bool {
        self.status.as_deref() == Some("cancelled")
    }
}

/// Outcome of a create or replace call.
#[derive(Debug)]
pub enum WriteOutcome {
    /// The service accepted the event.
    Written(RemoteEvent),
    /// The identifier already names an existing record.
    Conflict {
        /// Raw error payload from the service.
        message: String,
    },
    /// Any other non-success response.
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Raw error payload from the service.
        message: String,
    },
}

/// Calendar operations the sync engine needs.
#[async_trait]
pub trait RemoteCalendarClient: Send + Sync {
    /// Fetches an event by identifier. `None` means a 404.
    async fn fetch_event(
        &self,
        token: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<Option<RemoteEvent>>;

    /// Creates an event with its embedded custom identifier.
    async fn insert_event(
        &self,
        token: &str,
        calendar_id: &str,
        payload: &EventPayload,
    ) -> Result<WriteOutcome>;

    /// Replaces an existing event by identifier.
    async fn replace_event(
        &self,
        token: &str,
        calendar_id: &str,
        event_id: &str,
        payload: &EventPayload,
    ) -> Result<WriteOutcome>;
}

/// Google Calendar REST implementation.
pub struct GoogleCalendarClient {
    client: Client,
    base_url: String,
}

impl GoogleCalendarClient {
    const API_ROOT: &'static str = "https://www.googleapis.com/calendar/v3";

    /// Client against the production API endpoint.
    pub fn new() -> Self {
        Self::with_base_url(Self::API_ROOT.to_string())
    }

    /// Client against a custom endpoint.
    pub fn with_base_url(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("unitime-sync/0.1.0")
            .build()
            .expect("Failed to create HTTP client");
        Self { client, base_url }
    }

    fn event_url(&self, calendar_id: &str, event_id: &str) -> String {
        format!(
            "{}/calendars/{}/events/{}",
            self.base_url, calendar_id, event_id
        )
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!("{}/calendars/{}/events", self.base_url, calendar_id)
    }

    async fn write_outcome(response: reqwest::Response) -> Result<WriteOutcome> {
        let status = response.status();
        if status.is_success() {
            return Ok(WriteOutcome::Written(response.json().await?));
        }
        let message = response.text().await.unwrap_or_default();
        if status == StatusCode::CONFLICT {
            Ok(WriteOutcome::Conflict { message })
        } else {
            Ok(WriteOutcome::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

impl Default for GoogleCalendarClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteCalendarClient for GoogleCalendarClient {
    async fn fetch_event(
        &self,
        token: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<Option<RemoteEvent>> {
        let response = self
            .client
            .get(self.event_url(calendar_id, event_id))
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => Err(Error::Calendar {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn insert_event(
        &self,
        token: &str,
        calendar_id: &str,
        payload: &EventPayload,
    ) -> Result<WriteOutcome> {
        let response = self
            .client
            .post(self.events_url(calendar_id))
            .bearer_auth(token)
            .json(payload)
            .send()
            .await?;
        Self::write_outcome(response).await
    }

    async fn replace_event(
        &self,
        token: &str,
        calendar_id: &str,
        event_id: &str,
        payload: &EventPayload,
    ) -> Result<WriteOutcome> {
        let response = self
            .client
            .put(self.event_url(calendar_id, event_id))
            .bearer_auth(token)
            .json(payload)
            .send()
            .await?;
        Self::write_outcome(response).await
    }
}
