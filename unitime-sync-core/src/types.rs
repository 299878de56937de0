use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::timecode::{self, ClockTime, DateRange};

/// Weekday letters accepted in the `days` column.
///
/// Monday=M, Tuesday=T, Wednesday=W, Thursday=R, Friday=F, Saturday=S,
/// Sunday=U.
pub const VALID_DAY_LETTERS: [char; 7] = ['M', 'T', 'W', 'R', 'F', 'S', 'U'];

/// Recognized schedule-type codes for a class meeting.
///
/// Rows whose type column is outside this set are not schedule rows and are
/// discarded during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleType {
    /// Lecture ("Lec")
    #[serde(rename = "Lec")]
    Lecture,
    /// Laboratory ("Lab")
    #[serde(rename = "Lab")]
    Laboratory,
    /// Recitation ("Rec")
    #[serde(rename = "Rec")]
    Recitation,
    /// Practicum/Studio ("Stu")
    #[serde(rename = "Stu")]
    Studio,
    /// Practice/Clinic ("Prc")
    #[serde(rename = "Prc")]
    Practice,
    /// Seminar ("Sem")
    #[serde(rename = "Sem")]
    Seminar,
    /// Individual instruction ("Ind")
    #[serde(rename = "Ind")]
    Individual,
}

impl ScheduleType {
    /// Parses a schedule-type code, case-insensitively.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "lec" => Some(Self::Lecture),
            "lab" => Some(Self::Laboratory),
            "rec" => Some(Self::Recitation),
            "stu" => Some(Self::Studio),
            "prc" => Some(Self::Practice),
            "sem" => Some(Self::Seminar),
            "ind" => Some(Self::Individual),
            _ => None,
        }
    }

    /// Canonical code as it appears in the schedule table.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Lecture => "Lec",
            Self::Laboratory => "Lab",
            Self::Recitation => "Rec",
            Self::Studio => "Stu",
            Self::Practice => "Prc",
            Self::Seminar => "Sem",
            Self::Individual => "Ind",
        }
    }
}

/// Day-string validation failure, surfaced to the editing collaborator.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DaysError {
    #[error("unknown day letter '{0}', only M, T, W, R, F, S, U are allowed")]
    UnknownLetter(char),
    #[error("day letter '{0}' appears more than once")]
    DuplicateLetter(char),
}

/// Checks that `days` contains only valid weekday letters, each at most once.
pub fn validate_days(days: &str) -> Result<(), DaysError> {
    let mut seen: Vec<char> = Vec::new();
    for letter in days.chars() {
        if !VALID_DAY_LETTERS.contains(&letter) {
            return Err(DaysError::UnknownLetter(letter));
        }
        if seen.contains(&letter) {
            return Err(DaysError::DuplicateLetter(letter));
        }
        seen.push(letter);
    }
    Ok(())
}

/// One meeting pattern for one course section, as extracted from the page.
///
/// All fields hold the table text verbatim; nothing is inferred beyond the
/// row-inheritance rule applied during extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    /// Subject code, e.g. "CS".
    pub subject: String,
    /// Course number, e.g. "180".
    pub course: String,
    /// Meeting type code.
    #[serde(rename = "type")]
    pub schedule_type: ScheduleType,
    /// Derived display label.
    pub name: String,
    /// Course registration reference number.
    pub crn: String,
    /// Seat availability text.
    pub availability: String,
    /// Weekday letter string, e.g. "MWF".
    pub days: String,
    /// Compact start-time token, e.g. "9:30a".
    pub start_time: String,
    /// Compact end-time token, e.g. "10:20a".
    pub end_time: String,
    /// Compact "MM/DD - MM/DD" range token.
    pub date_range: String,
    /// Meeting room.
    pub room: String,
    /// Instructor name(s).
    pub instructor: String,
    /// Prerequisite/corequisite text.
    pub requires: String,
    /// Credit hours text.
    pub credits: String,
    /// Grade mode text.
    pub grade_mode: String,
}

impl ScheduleEntry {
    /// Display label derived from the semantic fields.
    pub fn display_name(&self) -> String {
        format!("{} {} {}", self.subject, self.course, self.schedule_type.code())
            .trim()
            .to_string()
    }

    /// Label used in reports: the stored name, or the derived one if empty.
    pub fn summary(&self) -> String {
        if self.name.trim().is_empty() {
            self.display_name()
        } else {
            self.name.clone()
        }
    }

    /// Validates the `days` field against the weekday-letter invariant.
    pub fn validate_days(&self) -> Result<(), DaysError> {
        validate_days(&self.days)
    }

    /// Parses the date/time tokens and computes the event identity, with the
    /// date range anchored to the current local year.
    pub fn prepare(&self) -> Result<PreparedEntry<'_>, PrepareError> {
        self.prepare_in_year(timecode::current_year())
    }

    /// Like [`Self::prepare`], with an explicit anchor year.
    pub fn prepare_in_year(&self, year: i32) -> Result<PreparedEntry<'_>, PrepareError> {
        if self.days.trim().is_empty() {
            return Err(PrepareError::EmptyDays);
        }
        let range = timecode::parse_date_range_in_year(&self.date_range, year)
            .ok_or_else(|| PrepareError::BadDateRange(self.date_range.clone()))?;
        let start = timecode::parse_time(&self.start_time)
            .ok_or_else(|| PrepareError::BadTime(self.start_time.clone()))?;
        let end = timecode::parse_time(&self.end_time)
            .ok_or_else(|| PrepareError::BadTime(self.end_time.clone()))?;
        Ok(PreparedEntry {
            entry: self,
            range,
            start,
            end,
            event_id: crate::event_id::generate_event_id(self),
        })
    }
}

/// An entry whose tokens parsed successfully, ready for sync or export.
#[derive(Debug, Clone)]
pub struct PreparedEntry<'a> {
    /// The source entry.
    pub entry: &'a ScheduleEntry,
    /// Parsed term date range.
    pub range: DateRange,
    /// Parsed meeting start time.
    pub start: ClockTime,
    /// Parsed meeting end time.
    pub end: ClockTime,
    /// Deterministic event identity.
    pub event_id: String,
}

/// Why an entry could not be prepared for sync/export.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PrepareError {
    #[error("entry has no meeting days")]
    EmptyDays,
    #[error("unparseable date range '{0}'")]
    BadDateRange(String),
    #[error("unparseable time '{0}'")]
    BadTime(String),
}

/// Outcome of synchronizing one entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResult {
    /// Human-readable entry label.
    pub summary: String,
    /// Whether the entry ended up in the calendar (created, updated or
    /// already present).
    pub success: bool,
    /// The entry already existed remotely; no write was issued.
    pub skipped: bool,
    /// A conflicting event was replaced instead of created.
    pub updated: bool,
    /// Remote event identifier, when known.
    pub event_id: Option<String>,
    /// Raw error text for failures.
    pub error: Option<String>,
}

impl SyncResult {
    /// A freshly created event.
    pub fn added(summary: String, event_id: String) -> Self {
        Self {
            summary,
            success: true,
            skipped: false,
            updated: false,
            event_id: Some(event_id),
            error: None,
        }
    }

    /// An event that already existed; nothing was written.
    pub fn skipped(summary: String, event_id: String) -> Self {
        Self {
            summary,
            success: true,
            skipped: true,
            updated: false,
            event_id: Some(event_id),
            error: None,
        }
    }

    /// An event replaced after an identity conflict.
    pub fn updated(summary: String, event_id: String) -> Self {
        Self {
            summary,
            success: true,
            skipped: false,
            updated: true,
            event_id: Some(event_id),
            error: None,
        }
    }

    /// A failed entry with its raw error text.
    pub fn failure(summary: String, error: String) -> Self {
        Self {
            summary,
            success: false,
            skipped: false,
            updated: false,
            event_id: None,
            error: Some(error),
        }
    }

    /// Short human-readable reason for display, derived from the raw error.
    pub fn friendly_error(&self) -> String {
        self.error
            .as_deref()
            .map_or_else(|| "Failed to add".to_string(), friendly_error_message)
    }
}

/// Overall status of a synchronization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStatus {
    /// At least one event was added and nothing failed.
    Complete,
    /// Every entry was already in the calendar.
    AlreadySynced,
    /// Some entries failed, some succeeded or were skipped.
    Partial,
    /// Every entry failed.
    Failed,
    /// No entries were attempted.
    Nothing,
}

/// Aggregated report over one synchronization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    /// Events newly created (or updated after a conflict).
    pub added: usize,
    /// Events skipped because they already existed.
    pub skipped: usize,
    /// Entries that failed.
    pub failed: usize,
    /// Per-entry outcomes, in input order.
    pub results: Vec<SyncResult>,
}

impl SyncReport {
    /// Builds the report from per-entry outcomes.
    pub fn from_results(results: Vec<SyncResult>) -> Self {
        let added = results.iter().filter(|r| r.success && !r.skipped).count();
        let skipped = results.iter().filter(|r| r.success && r.skipped).count();
        let failed = results.iter().filter(|r| !r.success).count();
        Self {
            added,
            skipped,
            failed,
            results,
        }
    }

    /// A single synthetic failed result for an error outside the per-entry
    /// loop (e.g. the entry sequence itself could not be loaded).
    pub fn from_batch_error(context: &str, error: String) -> Self {
        Self::from_results(vec![SyncResult::failure(context.to_string(), error)])
    }

    /// Overall status shown to the user.
    pub fn status(&self) -> SyncStatus {
        if self.results.is_empty() {
            SyncStatus::Nothing
        } else if self.failed == 0 && self.added > 0 {
            SyncStatus::Complete
        } else if self.failed == 0 {
            SyncStatus::AlreadySynced
        } else if self.added > 0 || self.skipped > 0 {
            SyncStatus::Partial
        } else {
            SyncStatus::Failed
        }
    }

    /// One-line headline for the report.
    pub fn headline(&self) -> String {
        match self.status() {
            SyncStatus::Complete => format!(
                "Sync complete: added {} event{}",
                self.added,
                plural(self.added)
            ),
            SyncStatus::AlreadySynced => format!(
                "Already synced: all {} event{} were in the calendar",
                self.skipped,
                plural(self.skipped)
            ),
            SyncStatus::Partial => format!(
                "Partially complete: {} event{} failed to sync",
                self.failed,
                plural(self.failed)
            ),
            SyncStatus::Failed => "Sync failed: unable to add events to the calendar".to_string(),
            SyncStatus::Nothing => "Nothing to sync".to_string(),
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Maps raw error text to a short category for display.
///
/// Full detail stays in the diagnostic log; this only recognizes the common
/// cases (auth, quota, permission, network) and falls back to a generic
/// message for long technical payloads.
pub fn friendly_error_message(raw: &str) -> String {
    if raw.contains("bad client id") {
        return "Invalid OAuth configuration. Please check the client setup.".to_string();
    }
    if raw.contains("OAuth2") {
        return "Authentication failed. Please try again.".to_string();
    }
    if raw.contains("token") {
        return "Authentication token expired. Please try again.".to_string();
    }
    if raw.contains("quota") {
        return "Calendar API quota exceeded. Try again later.".to_string();
    }
    if raw.contains("permission") {
        return "Missing calendar permissions. Re-authorize access.".to_string();
    }
    if raw.contains("network") || raw.contains("connect") {
        return "Network error. Check your connection and try again.".to_string();
    }
    if raw.len() > 80 {
        return "An error occurred. Check the log for details.".to_string();
    }
    raw.to_string()
}
