//! Error types for birthdays365.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by a collaborator (contacts, calendars, events).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Service responded with {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Could not decode response: {0}")]
    Decode(String),

    #[error("Authentication error: {0}")]
    Auth(String),
}

impl SourceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SourceError::Transport(_) => ErrorKind::Transport,
            SourceError::Service { status, .. } => ErrorKind::Service(*status),
            SourceError::Decode(_) => ErrorKind::Decode,
            SourceError::Auth(_) => ErrorKind::Auth,
        }
    }
}

/// Result type alias for collaborator calls.
pub type SourceResult<T> = Result<T, SourceError>;

/// Coarse classification of a failed mutation, kept in the sync summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transport,
    Service(u16),
    Decode,
    Auth,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Transport => write!(f, "transport"),
            ErrorKind::Service(status) => write!(f, "service ({status})"),
            ErrorKind::Decode => write!(f, "decode"),
            ErrorKind::Auth => write!(f, "auth"),
        }
    }
}

/// Fatal errors: the run stops before any mutation is attempted.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Unable to access or create the calendar '{name}': {source}")]
    Directory {
        name: String,
        #[source]
        source: SourceError,
    },

    #[error("Could not retrieve contacts: {0}")]
    FetchContacts(#[source] SourceError),

    #[error("Could not list existing birthday events: {0}")]
    FetchEvents(#[source] SourceError),
}

/// A create or update that failed for one contact.
#[derive(Error, Debug, Clone)]
#[error("Failed to sync birthday for contact {contact_id}: {source}")]
pub struct MutationError {
    pub contact_id: String,
    pub kind: ErrorKind,
    #[source]
    pub source: SourceError,
}

impl MutationError {
    pub fn new(contact_id: impl Into<String>, source: SourceError) -> Self {
        MutationError {
            contact_id: contact_id.into(),
            kind: source.kind(),
            source,
        }
    }
}
