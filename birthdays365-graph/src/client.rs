//! Microsoft Graph client.
//!
//! Implements the capability traits from `birthdays365-core` on top of the
//! Graph REST API. Every call is scoped to one mailbox: the signed-in user
//! (`/me`) or an explicit user principal name (`/users/{upn}`).

use anyhow::Context;
use async_trait::async_trait;
use birthdays365_core::source::{CalendarSource, ContactSource, EventSource};
use birthdays365_core::{
    CalendarEvent, CalendarInfo, EventPayload, RawContact, SourceError, SourceResult,
};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::convert::{FromGraph, ToGraph, extended_properties_expand};
use crate::types::{Calendar, Contact, ErrorResponse, Event, Page};

pub const DEFAULT_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

const CONTACT_FIELDS: &str = "id,displayName,givenName,surname,birthday";
const CALENDAR_FIELDS: &str = "id,name";
const EVENT_FIELDS: &str = "id,subject,start,end,isAllDay,isReminderOn,recurrence,createdDateTime";

/// Whose mailbox the client reads and writes.
#[derive(Debug, Clone, PartialEq)]
pub enum UserTarget {
    Me,
    User(String),
}

impl UserTarget {
    pub fn from_upn(upn: Option<&str>) -> Self {
        match upn.map(str::trim) {
            Some(upn) if !upn.is_empty() => UserTarget::User(upn.to_string()),
            _ => UserTarget::Me,
        }
    }
}

pub struct GraphClient {
    http: reqwest::Client,
    base_url: Url,
    access_token: String,
    user: UserTarget,
}

impl GraphClient {
    pub fn new(base_url: &str, access_token: String, user: UserTarget) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid Graph base URL: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Graph base URL cannot be used as a base: {base_url}");
        }

        Ok(GraphClient {
            http: reqwest::Client::new(),
            base_url,
            access_token,
            user,
        })
    }

    /// Build `{base}/{me|users/upn}/{segments...}`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            match &self.user {
                UserTarget::Me => {
                    path.push("me");
                }
                UserTarget::User(upn) => {
                    path.push("users").push(upn);
                }
            }
            path.extend(segments);
        }
        url
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> SourceResult<T> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(error) => format!("{} ({})", error.error.message, error.error.code),
                Err(_) if body.trim().is_empty() => status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
                Err(_) => body,
            };
            if status == StatusCode::UNAUTHORIZED {
                return Err(SourceError::Auth(message));
            }
            return Err(SourceError::Service {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| SourceError::Decode(e.to_string()))
    }

    /// Follow `@odata.nextLink` until the collection is exhausted.
    async fn get_all<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> SourceResult<Vec<T>> {
        let mut items = Vec::new();
        let mut page: Page<T> = self.send(self.http.get(url).query(query)).await?;

        loop {
            items.append(&mut page.value);

            let Some(next_link) = page.next_link.take() else {
                break;
            };
            tracing::debug!(next = %next_link, "Fetching next page");
            page = self.send(self.http.get(&next_link)).await?;
        }

        Ok(items)
    }
}

#[async_trait]
impl ContactSource for GraphClient {
    async fn list_contacts(&self) -> SourceResult<Vec<RawContact>> {
        let contacts: Vec<Contact> = self
            .get_all(self.endpoint(&["contacts"]), &[("$select", CONTACT_FIELDS)])
            .await?;

        contacts.into_iter().map(RawContact::from_graph).collect()
    }
}

#[async_trait]
impl CalendarSource for GraphClient {
    async fn list_calendars(&self) -> SourceResult<Vec<CalendarInfo>> {
        let calendars: Vec<Calendar> = self
            .get_all(self.endpoint(&["calendars"]), &[("$select", CALENDAR_FIELDS)])
            .await?;

        calendars.into_iter().map(CalendarInfo::from_graph).collect()
    }

    async fn create_calendar(&self, name: &str) -> SourceResult<String> {
        let request = self
            .http
            .post(self.endpoint(&["calendars"]))
            .json(&name.to_graph());
        let calendar: Calendar = self.send(request).await?;

        Ok(CalendarInfo::from_graph(calendar)?.id)
    }
}

#[async_trait]
impl EventSource for GraphClient {
    async fn list_events(&self, calendar_id: &str) -> SourceResult<Vec<CalendarEvent>> {
        let expand = extended_properties_expand();
        let events: Vec<Event> = self
            .get_all(
                self.endpoint(&["calendars", calendar_id, "events"]),
                &[
                    ("$select", EVENT_FIELDS),
                    ("$expand", expand.as_str()),
                    ("$orderby", "createdDateTime"),
                ],
            )
            .await?;

        let mut converted = Vec::with_capacity(events.len());
        for event in events {
            let tracked = event
                .single_value_extended_properties
                .as_ref()
                .is_some_and(|properties| !properties.is_empty());

            match CalendarEvent::from_graph(event) {
                Ok(event) => converted.push(event),
                Err(err) if !tracked => {
                    tracing::warn!(error = %err, "Skipping unreadable event not created by a sync");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(converted)
    }

    async fn create_event(&self, calendar_id: &str, payload: &EventPayload) -> SourceResult<String> {
        let request = self
            .http
            .post(self.endpoint(&["calendars", calendar_id, "events"]))
            .json(&payload.to_graph());
        let created: Event = self.send(request).await?;

        created
            .id
            .ok_or_else(|| SourceError::Decode("created event has no id".to_string()))
    }

    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        payload: &EventPayload,
    ) -> SourceResult<()> {
        let request = self
            .http
            .patch(self.endpoint(&["calendars", calendar_id, "events", event_id]))
            .json(&payload.to_graph());
        let _: serde_json::Value = self.send(request).await?;

        Ok(())
    }
}
