//! Capabilities the sync needs from the remote service.

use async_trait::async_trait;

use crate::error::SourceResult;
use crate::event::{CalendarEvent, CalendarInfo};
use crate::payload::EventPayload;
use crate::record::RawContact;

#[async_trait]
pub trait ContactSource: Send + Sync {
    async fn list_contacts(&self) -> SourceResult<Vec<RawContact>>;
}

#[async_trait]
pub trait CalendarSource: Send + Sync {
    async fn list_calendars(&self) -> SourceResult<Vec<CalendarInfo>>;

    /// Returns the id of the new calendar.
    async fn create_calendar(&self, name: &str) -> SourceResult<String>;
}

#[async_trait]
pub trait EventSource: Send + Sync {
    /// Events in listing order.
    async fn list_events(&self, calendar_id: &str) -> SourceResult<Vec<CalendarEvent>>;

    /// Returns the id of the new event.
    async fn create_event(&self, calendar_id: &str, payload: &EventPayload)
    -> SourceResult<String>;

    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        payload: &EventPayload,
    ) -> SourceResult<()>;
}
