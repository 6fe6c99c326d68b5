//! Applies reconciliation actions to the birthday calendar.

use chrono::NaiveDate;

use crate::context::ReminderOptions;
use crate::error::MutationError;
use crate::payload::EventPayload;
use crate::reconcile::Action;
use crate::source::EventSource;
use crate::summary::SyncSummary;

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Created(String),
    Updated(String),
    Skipped,
}

pub struct MutationExecutor<'a, E: EventSource> {
    events: &'a E,
    calendar_id: &'a str,
    reminder: &'a ReminderOptions,
    today: NaiveDate,
}

impl<'a, E: EventSource> MutationExecutor<'a, E> {
    pub fn new(
        events: &'a E,
        calendar_id: &'a str,
        reminder: &'a ReminderOptions,
        today: NaiveDate,
    ) -> Self {
        MutationExecutor {
            events,
            calendar_id,
            reminder,
            today,
        }
    }

    pub async fn execute(&self, action: &Action) -> Result<Outcome, MutationError> {
        match action {
            Action::Create(record) => {
                let payload = EventPayload::for_record(record, self.today, self.reminder);
                let event_id = self
                    .events
                    .create_event(self.calendar_id, &payload)
                    .await
                    .map_err(|e| MutationError::new(&record.contact_id, e))?;
                tracing::info!(contact_id = %record.contact_id, %event_id, "Created birthday event");
                Ok(Outcome::Created(event_id))
            }
            Action::Update {
                record,
                event_id,
                changed_fields,
            } => {
                let payload = EventPayload::for_record(record, self.today, self.reminder);
                self.events
                    .update_event(self.calendar_id, event_id, &payload)
                    .await
                    .map_err(|e| MutationError::new(&record.contact_id, e))?;
                tracing::info!(
                    contact_id = %record.contact_id,
                    %event_id,
                    changed = ?changed_fields,
                    "Updated birthday event"
                );
                Ok(Outcome::Updated(event_id.clone()))
            }
            Action::NoOp(record) => {
                tracing::debug!(contact_id = %record.contact_id, "Birthday event up to date");
                Ok(Outcome::Skipped)
            }
        }
    }

    /// Execute `actions` one at a time. A failed action is recorded and the
    /// rest still run.
    pub async fn apply(&self, actions: &[Action]) -> SyncSummary {
        let mut summary = SyncSummary::default();

        for action in actions {
            let result = self.execute(action).await;
            if let Err(err) = &result {
                tracing::warn!(error = %err, "Birthday event not synced");
            }
            summary.record(&result);
        }

        summary
    }
}
