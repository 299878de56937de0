//! Deterministic event identity.
//!
//! The calendar API only accepts custom event identifiers drawn from the
//! base32hex alphabet (`0-9a-v`), 5 to 1024 characters. Encoding the
//! entry's semantic fields into that alphabet makes repeated syncs
//! idempotent: the same class always maps to the same identifier. This is
//! deliberately not a cryptographic hash; two entries collide only when all
//! nine identity fields match, and such entries are the same class.

use crate::types::ScheduleEntry;

const MIN_LEN: usize = 5;
const MAX_LEN: usize = 1024;
const PAD_DIGIT: char = '0';

/// Computes the stable identifier for a schedule entry.
///
/// The nine identity fields are joined with `|`, lowercased, and each
/// character's code point is emitted as two base32hex digits (high and low
/// component). Changing any identity field changes the output.
pub fn generate_event_id(entry: &ScheduleEntry) -> String {
    let unique = [
        entry.subject.as_str(),
        entry.course.as_str(),
        entry.schedule_type.code(),
        entry.crn.as_str(),
        entry.days.as_str(),
        entry.start_time.as_str(),
        entry.end_time.as_str(),
        entry.date_range.as_str(),
        entry.room.as_str(),
    ]
    .join("|")
    .to_lowercase();

    let mut encoded = String::with_capacity(unique.len() * 2);
    for ch in unique.chars() {
        let code = ch as u32;
        encoded.push(base32hex_digit((code / 32) % 32));
        encoded.push(base32hex_digit(code % 32));
    }

    while encoded.len() < MIN_LEN {
        encoded.push(PAD_DIGIT);
    }
    if encoded.len() > MAX_LEN {
        encoded.truncate(MAX_LEN);
    }
    encoded
}

/// Maps 0-31 to the base32hex alphabet: 0-9 then a-v.
fn base32hex_digit(value: u32) -> char {
    if value < 10 {
        char::from(b'0' + value as u8)
    } else {
        char::from(b'a' + (value - 10) as u8)
    }
}
