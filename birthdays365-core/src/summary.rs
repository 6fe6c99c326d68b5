//! Result of a sync run.

use serde::Serialize;

use crate::error::{ErrorKind, MutationError};
use crate::executor::Outcome;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    /// In execution order.
    pub failures: Vec<(String, ErrorKind)>,
}

impl SyncSummary {
    pub fn record(&mut self, result: &Result<Outcome, MutationError>) {
        match result {
            Ok(Outcome::Created(_)) => self.created += 1,
            Ok(Outcome::Updated(_)) => self.updated += 1,
            Ok(Outcome::Skipped) => self.skipped += 1,
            Err(err) => {
                self.failed += 1;
                self.failures.push((err.contact_id.clone(), err.kind));
            }
        }
    }

    pub fn total(&self) -> usize {
        self.created + self.updated + self.skipped + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
