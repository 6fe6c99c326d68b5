//! Index of existing birthday events by contact.

use std::collections::HashMap;

use crate::event::CalendarEvent;

/// Existing events keyed by the contact they were created for.
#[derive(Debug, Clone, Default)]
pub struct EventIndex {
    by_contact: HashMap<String, CalendarEvent>,
    /// Events sharing a contact id with the canonical one. Left untouched.
    pub duplicates: Vec<CalendarEvent>,
    /// Events with no recoverable contact id.
    pub untracked: usize,
}

impl EventIndex {
    pub fn get(&self, contact_id: &str) -> Option<&CalendarEvent> {
        self.by_contact.get(contact_id)
    }

    pub fn len(&self) -> usize {
        self.by_contact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_contact.is_empty()
    }

    /// Canonical events, in no particular order.
    pub fn events(&self) -> impl Iterator<Item = &CalendarEvent> {
        self.by_contact.values()
    }

    /// Insert `event`, keeping whichever of it and the current entry is
    /// canonical: the earliest created, or the one seen first on a tie.
    fn insert(&mut self, contact_id: String, event: CalendarEvent) {
        let Some(current) = self.by_contact.get_mut(&contact_id) else {
            self.by_contact.insert(contact_id, event);
            return;
        };

        let replaces = match (event.created, current.created) {
            (Some(new), Some(existing)) => new < existing,
            (Some(_), None) => true,
            _ => false,
        };

        let kept = if replaces {
            event.event_id.as_str()
        } else {
            current.event_id.as_str()
        };
        tracing::warn!(%contact_id, kept, "Several birthday events share one contact");

        if replaces {
            let displaced = std::mem::replace(current, event);
            self.duplicates.push(displaced);
        } else {
            self.duplicates.push(event);
        }
    }
}

impl FromIterator<CalendarEvent> for EventIndex {
    fn from_iter<I: IntoIterator<Item = CalendarEvent>>(events: I) -> Self {
        let mut index = EventIndex::default();

        for event in events {
            match event.contact_id.clone() {
                Some(contact_id) => index.insert(contact_id, event),
                None => index.untracked += 1,
            }
        }

        index
    }
}

/// Index `events` in listing order.
pub fn build_index(events: Vec<CalendarEvent>) -> EventIndex {
    events.into_iter().collect()
}
