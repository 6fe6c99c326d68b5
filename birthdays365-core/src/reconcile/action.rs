use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::BirthdayRecord;

/// A property of a birthday event that drifted from its contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangedField {
    Date,
    Year,
    DisplayName,
}

impl fmt::Display for ChangedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangedField::Date => write!(f, "date"),
            ChangedField::Year => write!(f, "year"),
            ChangedField::DisplayName => write!(f, "name"),
        }
    }
}

/// What to do with one contact's birthday event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Create(BirthdayRecord),
    Update {
        record: BirthdayRecord,
        event_id: String,
        changed_fields: Vec<ChangedField>,
    },
    NoOp(BirthdayRecord),
}

impl Action {
    pub fn record(&self) -> &BirthdayRecord {
        match self {
            Action::Create(record) | Action::NoOp(record) => record,
            Action::Update { record, .. } => record,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Action::Create(_) => "+",
            Action::Update { .. } => "~",
            Action::NoOp(_) => "=",
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Action::NoOp(_))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.symbol(), self.record().display_name)
    }
}
