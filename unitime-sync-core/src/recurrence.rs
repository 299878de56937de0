//! Weekly recurrence derivation from the schedule's day-letter codes.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::timecode;

/// Maps a weekday letter to its two-letter RRULE token.
pub fn day_token(letter: char) -> Option<&'static str> {
    match letter {
        'M' => Some("MO"),
        'T' => Some("TU"),
        'W' => Some("WE"),
        'R' => Some("TH"),
        'F' => Some("FR"),
        'S' => Some("SA"),
        'U' => Some("SU"),
        _ => None,
    }
}

/// Maps a weekday letter to a chrono weekday.
pub fn weekday_for_letter(letter: char) -> Option<Weekday> {
    match letter {
        'M' => Some(Weekday::Mon),
        'T' => Some(Weekday::Tue),
        'W' => Some(Weekday::Wed),
        'R' => Some(Weekday::Thu),
        'F' => Some(Weekday::Fri),
        'S' => Some(Weekday::Sat),
        'U' => Some(Weekday::Sun),
        _ => None,
    }
}

/// Converts a day string like "MWF" into BYDAY tokens, preserving input
/// order. Unmapped letters are dropped; they were rejected upstream.
pub fn by_day_tokens(days: &str) -> Vec<&'static str> {
    days.chars().filter_map(day_token).collect()
}

/// The earliest date on/after `start` whose weekday is in `days`.
///
/// The search is bounded to seven days; if nothing matches (e.g. an empty
/// day set) the range start itself is the defined fallback.
pub fn first_occurrence_on_or_after(start: NaiveDate, days: &str) -> NaiveDate {
    let targets: Vec<Weekday> = days.chars().filter_map(weekday_for_letter).collect();
    for offset in 0..7 {
        let date = start + Duration::days(offset);
        if targets.contains(&date.weekday()) {
            return date;
        }
    }
    start
}

/// A weekly repetition rule bounded by an inclusive end date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyRule {
    /// BYDAY tokens in schedule order.
    pub by_day: Vec<&'static str>,
    /// Last date on which the meeting can occur.
    pub until: NaiveDate,
}

impl WeeklyRule {
    /// Derives the rule for an entry's day string and term end date.
    pub fn new(days: &str, until: NaiveDate) -> Self {
        Self {
            by_day: by_day_tokens(days),
            until,
        }
    }

    /// RRULE line for the calendar API, with a UTC-suffixed UNTIL bound.
    pub fn to_wire_rrule(&self) -> String {
        format!(
            "RRULE:FREQ=WEEKLY;BYDAY={};UNTIL={}",
            self.by_day.join(","),
            timecode::until_utc(self.until)
        )
    }

    /// RRULE line for the ICS export, with a local UNTIL bound.
    pub fn to_ics_rrule(&self) -> String {
        format!(
            "RRULE:FREQ=WEEKLY;BYDAY={};UNTIL={}",
            self.by_day.join(","),
            timecode::until_local(self.until)
        )
    }
}
