//! Core types for birthdays365.
//!
//! This crate holds everything that decides what happens to the birthday
//! calendar, independently of the service that hosts it:
//! - `record` turns raw contacts into validated `BirthdayRecord`s
//! - `index` and `reconcile` compare them against the existing events
//! - `executor` and `sync` apply the resulting actions through the
//!   capability traits in `source`

pub mod context;
pub mod directory;
pub mod error;
pub mod event;
pub mod executor;
pub mod index;
pub mod payload;
pub mod reconcile;
pub mod record;
pub mod source;
pub mod summary;
pub mod sync;

#[cfg(test)]
mod testing;

pub use context::{ReminderOptions, SyncContext, SyncOptions};
pub use error::{ErrorKind, MutationError, SourceError, SourceResult, SyncError};
pub use event::{CalendarEvent, CalendarInfo, EventDate, Recurrence};
pub use index::{EventIndex, build_index};
pub use payload::EventPayload;
pub use reconcile::{Action, ChangedField, find_orphans, reconcile};
pub use record::{BirthdayRecord, RawBirthday, RawContact, extract_records};
pub use summary::SyncSummary;
pub use sync::{SyncPlan, SyncState, Synchronizer};
