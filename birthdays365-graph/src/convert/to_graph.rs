use birthdays365_core::EventPayload;
use chrono::NaiveDate;

use super::{ToGraph, birth_year_property, contact_id_property};
use crate::types::{
    Calendar, DateTimeTimeZone, Event, ItemBody, PatternedRecurrence, RecurrencePattern,
    RecurrenceRange, SingleValueExtendedProperty,
};

impl ToGraph<Event> for EventPayload {
    fn to_graph(&self) -> Event {
        // A PATCH leaves unmentioned extended properties in place, so the
        // birth year is always written and an empty value clears it.
        let properties = vec![
            SingleValueExtendedProperty {
                id: contact_id_property(),
                value: self.contact_id.clone(),
            },
            SingleValueExtendedProperty {
                id: birth_year_property(),
                value: self.birth_year.map(|year| year.to_string()).unwrap_or_default(),
            },
        ];

        Event {
            id: None,
            subject: Some(self.subject.clone()),
            body: Some(ItemBody {
                content_type: "text".to_string(),
                content: self.body.clone(),
            }),
            start: Some(all_day(self.start)),
            end: Some(all_day(self.end)),
            is_all_day: Some(true),
            is_reminder_on: Some(self.reminder_minutes_before_start.is_some()),
            reminder_minutes_before_start: self.reminder_minutes_before_start,
            categories: Some(self.categories.clone()),
            recurrence: Some(PatternedRecurrence {
                pattern: RecurrencePattern {
                    kind: "absoluteYearly".to_string(),
                    interval: 1,
                    month: Some(self.recurrence.month),
                    day_of_month: Some(self.recurrence.day),
                },
                range: RecurrenceRange {
                    kind: "noEnd".to_string(),
                    start_date: Some(self.recurrence.start.format("%Y-%m-%d").to_string()),
                },
            }),
            created_date_time: None,
            single_value_extended_properties: Some(properties),
        }
    }
}

impl ToGraph<Calendar> for str {
    fn to_graph(&self) -> Calendar {
        Calendar {
            id: String::new(),
            name: self.to_string(),
        }
    }
}

fn all_day(date: NaiveDate) -> DateTimeTimeZone {
    DateTimeTimeZone {
        date_time: format!("{}T00:00:00", date.format("%Y-%m-%d")),
        time_zone: "UTC".to_string(),
    }
}
