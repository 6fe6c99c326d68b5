use birthdays365_core::{
    CalendarEvent, CalendarInfo, EventDate, RawBirthday, RawContact, Recurrence, SourceError,
    SourceResult,
};
use chrono::{Datelike, NaiveDate};

use super::{FromGraph, birth_year_property, contact_id_property};
use crate::types::{Calendar, Contact, Event, SingleValueExtendedProperty};

/// Outlook stores birthdays without a year in 1604.
const NO_YEAR_MARKER: i32 = 1604;

const ABSOLUTE_YEARLY: &str = "absoluteYearly";

impl FromGraph<Contact> for RawContact {
    fn from_graph(contact: Contact) -> SourceResult<Self> {
        let display_name = contact
            .display_name
            .filter(|name| !name.trim().is_empty())
            .or_else(|| join_name(contact.given_name.as_deref(), contact.surname.as_deref()));

        let birthday = contact.birthday.as_deref().and_then(|raw| {
            let parsed = parse_birthday(raw);
            if parsed.is_none() {
                tracing::debug!(contact_id = %contact.id, birthday = raw, "Unreadable birthday");
            }
            parsed
        });

        Ok(RawContact {
            id: contact.id,
            display_name,
            birthday,
        })
    }
}

impl FromGraph<Calendar> for CalendarInfo {
    fn from_graph(calendar: Calendar) -> SourceResult<Self> {
        if calendar.id.is_empty() {
            return Err(SourceError::Decode(format!(
                "calendar '{}' has no id",
                calendar.name
            )));
        }

        Ok(CalendarInfo {
            id: calendar.id,
            name: calendar.name,
        })
    }
}

impl FromGraph<Event> for CalendarEvent {
    fn from_graph(event: Event) -> SourceResult<Self> {
        let event_id = event
            .id
            .ok_or_else(|| SourceError::Decode("event has no id".to_string()))?;

        let properties = event.single_value_extended_properties.unwrap_or_default();
        let contact_id = property_value(&properties, &contact_id_property()).map(str::to_string);
        let birth_year = property_value(&properties, &birth_year_property())
            .and_then(|value| value.trim().parse::<i32>().ok());

        let recurrence = event.recurrence.as_ref().and_then(|recurrence| {
            let pattern = &recurrence.pattern;
            if pattern.kind != ABSOLUTE_YEARLY {
                return None;
            }
            match (pattern.month, pattern.day_of_month) {
                (Some(month), Some(day)) => Some(Recurrence::Yearly { month, day }),
                _ => None,
            }
        });

        let date = match recurrence {
            Some(Recurrence::Yearly { month, day }) => EventDate { month, day },
            None => event
                .start
                .as_ref()
                .and_then(|start| parse_date(&start.date_time))
                .map(|date| EventDate {
                    month: date.month(),
                    day: date.day(),
                })
                .ok_or_else(|| {
                    SourceError::Decode(format!("event {event_id} has no readable start date"))
                })?,
        };

        Ok(CalendarEvent {
            event_id,
            subject: event.subject.unwrap_or_default(),
            date,
            birth_year,
            is_all_day: event.is_all_day.unwrap_or(false),
            recurrence,
            reminder: event.is_reminder_on.unwrap_or(false),
            contact_id,
            created: event.created_date_time,
        })
    }
}

fn join_name(given: Option<&str>, surname: Option<&str>) -> Option<String> {
    let name = [given, surname]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    (!name.is_empty()).then_some(name)
}

/// Split `YYYY-MM-DD[THH:MM:SS...]` into its numeric parts. Range checks are
/// left to the record extractor.
fn parse_birthday(raw: &str) -> Option<RawBirthday> {
    let date = raw.split('T').next()?;
    let mut parts = date.splitn(3, '-');
    let year: i32 = parts.next()?.trim().parse().ok()?;
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let day: u32 = parts.next()?.trim().parse().ok()?;

    Some(RawBirthday {
        year: (year != NO_YEAR_MARKER).then_some(year),
        month,
        day,
    })
}

fn parse_date(date_time: &str) -> Option<NaiveDate> {
    let date = date_time.get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

fn property_value<'a>(properties: &'a [SingleValueExtendedProperty], id: &str) -> Option<&'a str> {
    properties
        .iter()
        .find(|property| property.id.eq_ignore_ascii_case(id))
        .map(|property| property.value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DateTimeTimeZone, PatternedRecurrence, RecurrencePattern, RecurrenceRange};

    fn contact(birthday: Option<&str>) -> Contact {
        Contact {
            id: "c1".to_string(),
            display_name: Some("Ada Lovelace".to_string()),
            given_name: Some("Ada".to_string()),
            surname: Some("Lovelace".to_string()),
            birthday: birthday.map(str::to_string),
        }
    }

    #[test]
    fn test_contact_birthday_with_year() {
        let raw = RawContact::from_graph(contact(Some("1815-12-10T00:00:00Z"))).unwrap();

        assert_eq!(raw.id, "c1");
        assert_eq!(raw.display_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(
            raw.birthday,
            Some(RawBirthday {
                year: Some(1815),
                month: 12,
                day: 10
            })
        );
    }

    #[test]
    fn test_contact_birthday_without_year() {
        let raw = RawContact::from_graph(contact(Some("1604-02-29T00:00:00Z"))).unwrap();

        assert_eq!(
            raw.birthday,
            Some(RawBirthday {
                year: None,
                month: 2,
                day: 29
            })
        );
    }

    #[test]
    fn test_contact_birthday_unvalidated_parts_pass_through() {
        let raw = RawContact::from_graph(contact(Some("1990-04-31T00:00:00Z"))).unwrap();
        assert_eq!(raw.birthday.map(|b| (b.month, b.day)), Some((4, 31)));

        let raw = RawContact::from_graph(contact(Some("not a date"))).unwrap();
        assert_eq!(raw.birthday, None);

        let raw = RawContact::from_graph(contact(None)).unwrap();
        assert_eq!(raw.birthday, None);
    }

    #[test]
    fn test_contact_name_falls_back_to_parts() {
        let mut c = contact(None);
        c.display_name = Some("  ".to_string());
        assert_eq!(
            RawContact::from_graph(c).unwrap().display_name.as_deref(),
            Some("Ada Lovelace")
        );

        let mut c = contact(None);
        c.display_name = None;
        c.given_name = None;
        c.surname = None;
        assert_eq!(RawContact::from_graph(c).unwrap().display_name, None);
    }

    fn synced_event() -> Event {
        Event {
            id: Some("e1".to_string()),
            subject: Some("🎂 Ada Lovelace".to_string()),
            start: Some(DateTimeTimeZone {
                date_time: "2025-12-10T00:00:00.0000000".to_string(),
                time_zone: "UTC".to_string(),
            }),
            is_all_day: Some(true),
            is_reminder_on: Some(true),
            recurrence: Some(PatternedRecurrence {
                pattern: RecurrencePattern {
                    kind: "absoluteYearly".to_string(),
                    interval: 1,
                    month: Some(12),
                    day_of_month: Some(10),
                },
                range: RecurrenceRange {
                    kind: "noEnd".to_string(),
                    start_date: Some("2025-12-10".to_string()),
                },
            }),
            single_value_extended_properties: Some(vec![
                SingleValueExtendedProperty {
                    id: contact_id_property(),
                    value: "c1".to_string(),
                },
                SingleValueExtendedProperty {
                    id: birth_year_property(),
                    value: "1815".to_string(),
                },
            ]),
            ..Event::default()
        }
    }

    #[test]
    fn test_event_recovers_extended_properties() {
        let event = CalendarEvent::from_graph(synced_event()).unwrap();

        assert_eq!(event.event_id, "e1");
        assert_eq!(event.contact_id.as_deref(), Some("c1"));
        assert_eq!(event.birth_year, Some(1815));
        assert_eq!(event.date, EventDate { month: 12, day: 10 });
        assert_eq!(event.recurrence, Some(Recurrence::Yearly { month: 12, day: 10 }));
        assert!(event.is_all_day);
        assert!(event.reminder);
    }

    #[test]
    fn test_event_date_prefers_recurrence_pattern() {
        let mut graph_event = synced_event();
        // Feb 29 series shown on Feb 28 in a common year
        graph_event.start = Some(DateTimeTimeZone {
            date_time: "2025-02-28T00:00:00".to_string(),
            time_zone: "UTC".to_string(),
        });
        if let Some(recurrence) = graph_event.recurrence.as_mut() {
            recurrence.pattern.month = Some(2);
            recurrence.pattern.day_of_month = Some(29);
        }

        let event = CalendarEvent::from_graph(graph_event).unwrap();

        assert_eq!(event.date, EventDate { month: 2, day: 29 });
    }

    #[test]
    fn test_untracked_event_falls_back_to_start() {
        let graph_event = Event {
            id: Some("manual".to_string()),
            subject: Some("Dentist".to_string()),
            start: Some(DateTimeTimeZone {
                date_time: "2025-03-04T09:30:00".to_string(),
                time_zone: "UTC".to_string(),
            }),
            ..Event::default()
        };

        let event = CalendarEvent::from_graph(graph_event).unwrap();

        assert_eq!(event.contact_id, None);
        assert_eq!(event.birth_year, None);
        assert_eq!(event.recurrence, None);
        assert_eq!(event.date, EventDate { month: 3, day: 4 });
    }

    #[test]
    fn test_event_without_id_or_date_is_decode_error() {
        let mut graph_event = synced_event();
        graph_event.id = None;
        assert!(matches!(
            CalendarEvent::from_graph(graph_event),
            Err(SourceError::Decode(_))
        ));

        let graph_event = Event {
            id: Some("e2".to_string()),
            ..Event::default()
        };
        assert!(matches!(
            CalendarEvent::from_graph(graph_event),
            Err(SourceError::Decode(_))
        ));
    }
}
