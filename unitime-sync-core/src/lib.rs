//! UniTime Sync Core Library
//!
//! This library extracts a student's class timetable from the university
//! timetabling page, normalizes it into typed schedule entries, and
//! synchronizes those entries into a remote calendar or exports them as an
//! ICS file. Synchronization is idempotent: every entry has a deterministic
//! identity, so repeated runs skip events that already exist.

pub mod calendar;
pub mod error;
pub mod event_id;
pub mod extract;
pub mod ics;
pub mod recurrence;
pub mod sync;
pub mod timecode;
pub mod types;

// Re-export core types and error handling
pub use error::{Error, Result};
pub use types::*;

/// Commonly used items
pub mod prelude {
    pub use crate::{
        calendar::*, event_id::*, extract::*, ics::*, recurrence::*, sync::*, timecode::*,
        types::*,
    };
}
