//! Get-or-create of the birthday calendar.

use crate::error::SyncError;
use crate::source::CalendarSource;

/// Resolves the birthday calendar and remembers its id for the session.
pub struct CalendarDirectory<'a, S: CalendarSource> {
    source: &'a S,
    resolved: Option<(String, String)>,
}

impl<'a, S: CalendarSource> CalendarDirectory<'a, S> {
    pub fn new(source: &'a S) -> Self {
        CalendarDirectory {
            source,
            resolved: None,
        }
    }

    /// Id of the calendar named exactly `name`, created if missing.
    pub async fn ensure_calendar(&mut self, name: &str) -> Result<String, SyncError> {
        match &self.resolved {
            Some((resolved_name, id)) if resolved_name == name => return Ok(id.clone()),
            _ => {}
        }

        let directory_error = |source| SyncError::Directory {
            name: name.to_string(),
            source,
        };

        let calendars = self.source.list_calendars().await.map_err(directory_error)?;

        let id = match calendars.into_iter().find(|c| c.name == name) {
            Some(calendar) => {
                tracing::debug!(calendar_id = %calendar.id, "Found birthday calendar");
                calendar.id
            }
            None => {
                let id = self
                    .source
                    .create_calendar(name)
                    .await
                    .map_err(directory_error)?;
                tracing::info!(calendar_id = %id, name, "Created birthday calendar");
                id
            }
        };

        self.resolved = Some((name.to_string(), id.clone()));
        Ok(id)
    }
}
