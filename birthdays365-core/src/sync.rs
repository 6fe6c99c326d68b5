//! Sync orchestration.
//!
//! A run moves through a fixed sequence of states:
//!
//! ```text
//! Init -> CalendarEnsured -> ContactsLoaded -> IndexBuilt -> Reconciled -> Executed -> Done
//! ```
//!
//! Anything that fails before `Reconciled` aborts the run with a `SyncError`
//! and no mutation is attempted. From there on the run always reaches `Done`;
//! per-event failures end up in the `SyncSummary`.

use std::fmt;

use crate::context::SyncContext;
use crate::directory::CalendarDirectory;
use crate::error::SyncError;
use crate::event::CalendarEvent;
use crate::executor::MutationExecutor;
use crate::index::build_index;
use crate::reconcile::{Action, find_orphans, reconcile};
use crate::record::{BirthdayRecord, extract_records};
use crate::source::{CalendarSource, ContactSource, EventSource};
use crate::summary::SyncSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Init,
    CalendarEnsured,
    ContactsLoaded,
    IndexBuilt,
    Reconciled,
    Executed,
    Done,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncState::Init => "init",
            SyncState::CalendarEnsured => "calendar ensured",
            SyncState::ContactsLoaded => "contacts loaded",
            SyncState::IndexBuilt => "index built",
            SyncState::Reconciled => "reconciled",
            SyncState::Executed => "executed",
            SyncState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Everything decided before touching the calendar.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub calendar_id: String,
    pub records: Vec<BirthdayRecord>,
    pub actions: Vec<Action>,
    /// Synced events whose contact no longer has a birthday. Never deleted.
    pub orphans: Vec<CalendarEvent>,
    /// Extra events for a contact that already has a canonical event.
    pub duplicates: Vec<CalendarEvent>,
    /// Events in the calendar that were not created by a sync.
    pub untracked: usize,
}

impl SyncPlan {
    /// Actions that will call the remote service.
    pub fn pending(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter(|a| !a.is_noop())
    }

    pub fn is_up_to_date(&self) -> bool {
        self.pending().next().is_none()
    }
}

pub struct Synchronizer<'a, S> {
    service: &'a S,
    context: &'a SyncContext,
    state: SyncState,
}

impl<'a, S> Synchronizer<'a, S>
where
    S: ContactSource + CalendarSource + EventSource,
{
    pub fn new(service: &'a S, context: &'a SyncContext) -> Self {
        Synchronizer {
            service,
            context,
            state: SyncState::Init,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    fn advance(&mut self, next: SyncState) {
        tracing::debug!(from = %self.state, to = %next, "Sync state changed");
        self.state = next;
    }

    /// Run up to `Reconciled` without changing anything remotely.
    pub async fn plan(&mut self) -> Result<SyncPlan, SyncError> {
        let context = self.context;

        let calendar_id = CalendarDirectory::new(self.service)
            .ensure_calendar(&context.options.calendar_name)
            .await?;
        self.advance(SyncState::CalendarEnsured);

        let contacts = self
            .service
            .list_contacts()
            .await
            .map_err(SyncError::FetchContacts)?;
        let records = extract_records(&contacts);
        tracing::info!(
            contacts = contacts.len(),
            birthdays = records.len(),
            "Loaded contacts"
        );
        self.advance(SyncState::ContactsLoaded);

        let events = self
            .service
            .list_events(&calendar_id)
            .await
            .map_err(SyncError::FetchEvents)?;
        let mut index = build_index(events);
        tracing::info!(
            tracked = index.len(),
            untracked = index.untracked,
            "Indexed existing birthday events"
        );
        self.advance(SyncState::IndexBuilt);

        let actions = reconcile(&records, &index);
        let orphans: Vec<CalendarEvent> = find_orphans(&records, &index)
            .into_iter()
            .cloned()
            .collect();
        for orphan in &orphans {
            tracing::warn!(
                event_id = %orphan.event_id,
                subject = %orphan.subject,
                "Birthday event has no matching contact, leaving it untouched"
            );
        }
        self.advance(SyncState::Reconciled);

        Ok(SyncPlan {
            calendar_id,
            records,
            actions,
            orphans,
            duplicates: std::mem::take(&mut index.duplicates),
            untracked: index.untracked,
        })
    }

    /// Apply a plan. Always reaches `Done`.
    pub async fn execute(&mut self, plan: &SyncPlan) -> SyncSummary {
        let executor = MutationExecutor::new(
            self.service,
            &plan.calendar_id,
            &self.context.options.reminder,
            self.context.today,
        );

        let summary = executor.apply(&plan.actions).await;
        self.advance(SyncState::Executed);

        tracing::info!(
            created = summary.created,
            updated = summary.updated,
            skipped = summary.skipped,
            failed = summary.failed,
            "Sync complete"
        );
        self.advance(SyncState::Done);

        summary
    }

    pub async fn run(&mut self) -> Result<SyncSummary, SyncError> {
        let plan = self.plan().await?;
        Ok(self.execute(&plan).await)
    }
}
