//! Parsing and formatting of the compact time/date tokens used by the
//! schedule page, and of the wire formats expected by the calendar side.

use std::sync::OnceLock;

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;

/// A parsed time of day in 24-hour form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    /// Hour, 0-23.
    pub hours: u32,
    /// Minute, 0-59.
    pub minutes: u32,
}

/// A parsed "MM/DD - MM/DD" term range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// First day of the range.
    pub start: NaiveDate,
    /// Last day of the range, inclusive.
    pub end: NaiveDate,
}

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^(\d{1,2}):(\d{2})([ap])$").expect("valid regex"))
}

/// Parses a compact time token like "9:30a" or "12:05p".
///
/// "12:XXa" maps to hour 0, "12:XXp" stays 12, other "p" hours add 12.
/// Returns `None` on structural mismatch or an out-of-range result; the
/// caller treats that as a parse failure for the entry, never a crash.
pub fn parse_time(token: &str) -> Option<ClockTime> {
    let captures = time_pattern().captures(token.trim())?;
    let mut hours: u32 = captures[1].parse().ok()?;
    let minutes: u32 = captures[2].parse().ok()?;
    let meridiem = captures[3].to_ascii_lowercase();

    if meridiem == "p" && hours != 12 {
        hours += 12;
    } else if meridiem == "a" && hours == 12 {
        hours = 0;
    }

    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(ClockTime { hours, minutes })
}

/// The current local year, used to anchor date-range tokens.
pub fn current_year() -> i32 {
    Local::now().year()
}

/// Parses a "MM/DD - MM/DD" token anchored to the current local year.
pub fn parse_date_range(token: &str) -> Option<DateRange> {
    parse_date_range_in_year(token, current_year())
}

/// Parses a "MM/DD - MM/DD" token anchored to an explicit year.
///
/// If the end month is numerically less than the start month the range
/// spans a calendar-year boundary and the end date lands in `year + 1`.
pub fn parse_date_range_in_year(token: &str, year: i32) -> Option<DateRange> {
    let parts: Vec<&str> = token.split(" - ").collect();
    if parts.len() != 2 {
        return None;
    }
    let (start_month, start_day) = parse_month_day(parts[0])?;
    let (end_month, end_day) = parse_month_day(parts[1])?;

    let end_year = if end_month < start_month { year + 1 } else { year };

    Some(DateRange {
        start: NaiveDate::from_ymd_opt(year, start_month, start_day)?,
        end: NaiveDate::from_ymd_opt(end_year, end_month, end_day)?,
    })
}

fn parse_month_day(part: &str) -> Option<(u32, u32)> {
    let (month, day) = part.trim().split_once('/')?;
    Some((month.parse().ok()?, day.parse().ok()?))
}

/// Renders a date + time as the local-time wire datetime the calendar API
/// expects ("YYYY-MM-DDTHH:MM:SS", no offset; the time zone travels in a
/// separate field).
pub fn local_date_time(date: NaiveDate, time: ClockTime) -> String {
    format!(
        "{}T{:02}:{:02}:00",
        date.format("%Y-%m-%d"),
        time.hours,
        time.minutes
    )
}

/// Renders a date as the compact ICS token "YYYYMMDD".
pub fn ics_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Renders a date + time as the compact ICS token "YYYYMMDDTHHMMSS".
pub fn ics_date_time(date: NaiveDate, time: ClockTime) -> String {
    format!("{}T{:02}{:02}00", ics_date(date), time.hours, time.minutes)
}

/// End-of-day recurrence bound in UTC form, "YYYYMMDDT235959Z".
pub fn until_utc(date: NaiveDate) -> String {
    format!("{}T235959Z", ics_date(date))
}

/// End-of-day recurrence bound in local form, "YYYYMMDDT235959".
pub fn until_local(date: NaiveDate) -> String {
    format!("{}T235959", ics_date(date))
}
