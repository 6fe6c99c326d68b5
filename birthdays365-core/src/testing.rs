//! In-memory remote service used by the tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{SourceError, SourceResult};
use crate::event::{CalendarEvent, CalendarInfo, EventDate, Recurrence};
use crate::payload::EventPayload;
use crate::record::{RawBirthday, RawContact};
use crate::source::{CalendarSource, ContactSource, EventSource};

#[derive(Default)]
struct State {
    contacts: Vec<RawContact>,
    calendars: Vec<CalendarInfo>,
    events: HashMap<String, Vec<CalendarEvent>>,
    calls: HashMap<&'static str, usize>,
    fail_next: HashMap<&'static str, SourceError>,
    failing_contacts: HashSet<String>,
    next_id: usize,
}

#[derive(Default)]
pub struct InMemoryService {
    state: Mutex<State>,
}

impl InMemoryService {
    pub fn add_contact(&self, id: &str, name: &str, birthday: Option<(Option<i32>, u32, u32)>) {
        self.state.lock().unwrap().contacts.push(RawContact {
            id: id.to_string(),
            display_name: Some(name.to_string()),
            birthday: birthday.map(|(year, month, day)| RawBirthday { year, month, day }),
        });
    }

    pub fn add_calendar(&self, id: &str, name: &str) {
        self.state.lock().unwrap().calendars.push(CalendarInfo {
            id: id.to_string(),
            name: name.to_string(),
        });
    }

    pub fn add_event(&self, calendar_id: &str, event: CalendarEvent) {
        self.state
            .lock()
            .unwrap()
            .events
            .entry(calendar_id.to_string())
            .or_default()
            .push(event);
    }

    pub fn calendars(&self) -> Vec<CalendarInfo> {
        self.state.lock().unwrap().calendars.clone()
    }

    pub fn events(&self, calendar_id: &str) -> Vec<CalendarEvent> {
        self.state
            .lock()
            .unwrap()
            .events
            .get(calendar_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    /// Make the next call to `operation` fail with `error`.
    pub fn fail_next(&self, operation: &'static str, error: SourceError) {
        self.state.lock().unwrap().fail_next.insert(operation, error);
    }

    /// Make every create or update for `contact_id` fail.
    pub fn fail_contact(&self, contact_id: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_contacts
            .insert(contact_id.to_string());
    }

    fn record_call(&self, operation: &'static str) -> SourceResult<()> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(operation).or_default() += 1;
        match state.fail_next.remove(operation) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn check_contact(&self, payload: &EventPayload) -> SourceResult<()> {
        if self
            .state
            .lock()
            .unwrap()
            .failing_contacts
            .contains(&payload.contact_id)
        {
            return Err(SourceError::Service {
                status: 500,
                message: "internal error".to_string(),
            });
        }
        Ok(())
    }
}

fn event_from_payload(event_id: String, payload: &EventPayload) -> CalendarEvent {
    let (month, day) = (payload.recurrence.month, payload.recurrence.day);
    CalendarEvent {
        event_id,
        subject: payload.subject.clone(),
        date: EventDate { month, day },
        birth_year: payload.birth_year,
        is_all_day: true,
        recurrence: Some(Recurrence::Yearly { month, day }),
        reminder: payload.reminder_minutes_before_start.is_some(),
        contact_id: Some(payload.contact_id.clone()),
        created: None,
    }
}

#[async_trait]
impl ContactSource for InMemoryService {
    async fn list_contacts(&self) -> SourceResult<Vec<RawContact>> {
        self.record_call("list_contacts")?;
        Ok(self.state.lock().unwrap().contacts.clone())
    }
}

#[async_trait]
impl CalendarSource for InMemoryService {
    async fn list_calendars(&self) -> SourceResult<Vec<CalendarInfo>> {
        self.record_call("list_calendars")?;
        Ok(self.calendars())
    }

    async fn create_calendar(&self, name: &str) -> SourceResult<String> {
        self.record_call("create_calendar")?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("calendar-{}", state.next_id);
        state.calendars.push(CalendarInfo {
            id: id.clone(),
            name: name.to_string(),
        });
        Ok(id)
    }
}

#[async_trait]
impl EventSource for InMemoryService {
    async fn list_events(&self, calendar_id: &str) -> SourceResult<Vec<CalendarEvent>> {
        self.record_call("list_events")?;
        Ok(self.events(calendar_id))
    }

    async fn create_event(&self, calendar_id: &str, payload: &EventPayload) -> SourceResult<String> {
        self.record_call("create_event")?;
        self.check_contact(payload)?;
        let event_id = {
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            format!("event-{}", state.next_id)
        };
        self.add_event(calendar_id, event_from_payload(event_id.clone(), payload));
        Ok(event_id)
    }

    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        payload: &EventPayload,
    ) -> SourceResult<()> {
        self.record_call("update_event")?;
        self.check_contact(payload)?;
        let mut state = self.state.lock().unwrap();
        let event = state
            .events
            .get_mut(calendar_id)
            .and_then(|events| events.iter_mut().find(|e| e.event_id == event_id))
            .ok_or_else(|| SourceError::Service {
                status: 404,
                message: format!("event {event_id} not found"),
            })?;
        // Patch semantics: fields the payload carries are overwritten, the
        // rest (creation time) stays.
        let patched = event_from_payload(event_id.to_string(), payload);
        event.subject = patched.subject;
        event.date = patched.date;
        event.birth_year = patched.birth_year;
        event.is_all_day = patched.is_all_day;
        event.recurrence = patched.recurrence;
        event.reminder = patched.reminder;
        event.contact_id = patched.contact_id;
        Ok(())
    }
}
