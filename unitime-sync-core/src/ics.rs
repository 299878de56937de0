//! ICS calendar export.

use chrono::Utc;

use crate::{
    Result,
    recurrence::{self, WeeklyRule},
    timecode,
    types::{PreparedEntry, ScheduleEntry},
};

/// Export options.
#[derive(Debug, Clone)]
pub struct IcsOptions {
    /// Optional X-WR-CALNAME value.
    pub calendar_name: Option<String>,
    /// IANA time-zone identifier for event times.
    pub timezone: String,
    /// Domain suffix appended to event UIDs.
    pub uid_domain: String,
}

impl Default for IcsOptions {
    fn default() -> Self {
        Self {
            calendar_name: None,
            timezone: "America/Indiana/Indianapolis".to_string(),
            uid_domain: "unitime-sync".to_string(),
        }
    }
}

/// Renders schedule entries into a portable calendar document.
///
/// Uses the same recurrence and identity logic as the sync engine, so
/// exported UIDs match remotely synced identifiers.
pub struct IcsExporter {
    options: IcsOptions,
}

impl IcsExporter {
    /// Exporter with the given options.
    pub fn new(options: IcsOptions) -> Self {
        Self { options }
    }

    /// Renders the full calendar document.
    ///
    /// Entries whose date/time tokens fail to parse are skipped with a
    /// logged reason; they never abort the export.
    pub fn export(&self, entries: &[ScheduleEntry]) -> Result<String> {
        let mut ics = String::new();

        ics.push_str("BEGIN:VCALENDAR\r\n");
        ics.push_str("VERSION:2.0\r\n");
        ics.push_str("PRODID:-//UniTime Sync//Class Schedule//EN\r\n");
        ics.push_str("CALSCALE:GREGORIAN\r\n");
        ics.push_str("METHOD:PUBLISH\r\n");
        if let Some(ref name) = self.options.calendar_name {
            ics.push_str(&format!("X-WR-CALNAME:{}\r\n", escape_text(name)));
        }
        ics.push_str(&format!("X-WR-TIMEZONE:{}\r\n", self.options.timezone));

        self.add_timezone_block(&mut ics);

        for entry in entries {
            match entry.prepare() {
                Ok(prepared) => self.add_event(&mut ics, &prepared),
                Err(e) => {
                    tracing::warn!(entry = %entry.summary(), error = %e,
                        "skipping entry in ICS export");
                }
            }
        }

        ics.push_str("END:VCALENDAR\r\n");
        Ok(ics)
    }

    /// One VTIMEZONE block with the US Eastern standard/daylight rules the
    /// institution observes.
    fn add_timezone_block(&self, ics: &mut String) {
        ics.push_str("BEGIN:VTIMEZONE\r\n");
        ics.push_str(&format!("TZID:{}\r\n", self.options.timezone));
        ics.push_str("BEGIN:STANDARD\r\n");
        ics.push_str("DTSTART:20231105T020000\r\n");
        ics.push_str("RRULE:FREQ=YEARLY;BYMONTH=11;BYDAY=1SU\r\n");
        ics.push_str("TZOFFSETFROM:-0400\r\n");
        ics.push_str("TZOFFSETTO:-0500\r\n");
        ics.push_str("END:STANDARD\r\n");
        ics.push_str("BEGIN:DAYLIGHT\r\n");
        ics.push_str("DTSTART:20240310T020000\r\n");
        ics.push_str("RRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=2SU\r\n");
        ics.push_str("TZOFFSETFROM:-0500\r\n");
        ics.push_str("TZOFFSETTO:-0400\r\n");
        ics.push_str("END:DAYLIGHT\r\n");
        ics.push_str("END:VTIMEZONE\r\n");
    }

    fn add_event(&self, ics: &mut String, prepared: &PreparedEntry<'_>) {
        let entry = prepared.entry;
        let first = recurrence::first_occurrence_on_or_after(prepared.range.start, &entry.days);
        let rule = WeeklyRule::new(&entry.days, prepared.range.end);
        let dtstamp = Utc::now().format("%Y%m%dT%H%M%SZ");

        ics.push_str("BEGIN:VEVENT\r\n");
        ics.push_str(&format!(
            "UID:{}@{}\r\n",
            prepared.event_id, self.options.uid_domain
        ));
        ics.push_str(&format!("DTSTAMP:{dtstamp}\r\n"));
        ics.push_str(&format!(
            "DTSTART;TZID={}:{}\r\n",
            self.options.timezone,
            timecode::ics_date_time(first, prepared.start)
        ));
        ics.push_str(&format!(
            "DTEND;TZID={}:{}\r\n",
            self.options.timezone,
            timecode::ics_date_time(first, prepared.end)
        ));
        ics.push_str(&format!("{}\r\n", rule.to_ics_rrule()));
        ics.push_str(&format!("SUMMARY:{}\r\n", escape_text(&entry.summary())));
        ics.push_str(&format!("LOCATION:{}\r\n", escape_text(&entry.room)));
        ics.push_str(&format!("DESCRIPTION:CRN: {}\r\n", escape_text(&entry.crn)));
        ics.push_str("STATUS:CONFIRMED\r\n");
        ics.push_str("END:VEVENT\r\n");
    }
}

impl Default for IcsExporter {
    fn default() -> Self {
        Self::new(IcsOptions::default())
    }
}

/// Escapes text per the calendar format's rules.
fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}
