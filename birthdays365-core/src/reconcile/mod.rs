//! Reconciliation of birthday records against the existing events.
//!
//! The engine only ever creates or corrects events. An event whose contact
//! disappeared, or lost its birthday, is reported by `find_orphans` and
//! otherwise left alone.

mod action;

use std::collections::HashSet;

pub use action::{Action, ChangedField};

use crate::event::{CalendarEvent, EventDate};
use crate::index::EventIndex;
use crate::payload::display_name_from_subject;
use crate::record::BirthdayRecord;

/// Decide one action per record, in record order.
pub fn reconcile(records: &[BirthdayRecord], index: &EventIndex) -> Vec<Action> {
    records
        .iter()
        .map(|record| match index.get(&record.contact_id) {
            None => Action::Create(record.clone()),
            Some(event) => {
                let changed_fields = changed_fields(record, event);
                if changed_fields.is_empty() {
                    Action::NoOp(record.clone())
                } else {
                    Action::Update {
                        record: record.clone(),
                        event_id: event.event_id.clone(),
                        changed_fields,
                    }
                }
            }
        })
        .collect()
}

/// Indexed events whose contact is not among `records`.
pub fn find_orphans<'a>(records: &[BirthdayRecord], index: &'a EventIndex) -> Vec<&'a CalendarEvent> {
    let known: HashSet<&str> = records.iter().map(|r| r.contact_id.as_str()).collect();

    let mut orphans: Vec<_> = index
        .events()
        .filter(|event| {
            event
                .contact_id
                .as_deref()
                .is_some_and(|id| !known.contains(id))
        })
        .collect();

    orphans.sort_by(|a, b| a.event_id.cmp(&b.event_id));
    orphans
}

fn changed_fields(record: &BirthdayRecord, event: &CalendarEvent) -> Vec<ChangedField> {
    let mut changed = Vec::new();

    let date = EventDate {
        month: record.month,
        day: record.day,
    };
    if event.date != date {
        changed.push(ChangedField::Date);
    }

    // Only compared when the event carries a year.
    if event.birth_year.is_some() && event.birth_year != record.year {
        changed.push(ChangedField::Year);
    }

    if display_name_from_subject(&event.subject) != record.display_name {
        changed.push(ChangedField::DisplayName);
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Recurrence;
    use crate::index::build_index;
    use crate::payload::subject_for;

    fn ada() -> BirthdayRecord {
        BirthdayRecord {
            contact_id: "c1".to_string(),
            display_name: "Ada".to_string(),
            month: 12,
            day: 10,
            year: Some(1815),
        }
    }

    fn record(id: &str, name: &str, month: u32, day: u32) -> BirthdayRecord {
        BirthdayRecord {
            contact_id: id.to_string(),
            display_name: name.to_string(),
            month,
            day,
            year: None,
        }
    }

    fn event_for(contact_id: &str, name: &str, month: u32, day: u32) -> CalendarEvent {
        CalendarEvent {
            event_id: format!("event-{contact_id}"),
            subject: subject_for(name),
            date: EventDate { month, day },
            birth_year: None,
            is_all_day: true,
            recurrence: Some(Recurrence::Yearly { month, day }),
            reminder: true,
            contact_id: Some(contact_id.to_string()),
            created: None,
        }
    }

    #[test]
    fn test_empty_index_creates_every_record() {
        let records = vec![
            ada(),
            record("c2", "Grace", 12, 9),
            record("c3", "Alan", 6, 23),
        ];

        let actions = reconcile(&records, &EventIndex::default());

        assert_eq!(actions.len(), records.len());
        for (action, record) in actions.iter().zip(&records) {
            assert_eq!(action, &Action::Create(record.clone()));
        }
    }

    #[test]
    fn test_matching_event_is_noop() {
        let index = build_index(vec![event_for("c1", "Ada", 12, 10)]);

        let actions = reconcile(&[ada()], &index);

        assert_eq!(actions, vec![Action::NoOp(ada())]);
    }

    #[test]
    fn test_moved_date_is_update() {
        let index = build_index(vec![event_for("c1", "Ada", 11, 10)]);

        let actions = reconcile(&[ada()], &index);

        assert_eq!(
            actions,
            vec![Action::Update {
                record: ada(),
                event_id: "event-c1".to_string(),
                changed_fields: vec![ChangedField::Date],
            }]
        );
    }

    #[test]
    fn test_renamed_contact_is_update() {
        let index = build_index(vec![event_for("c1", "Ada Byron", 12, 10)]);

        let actions = reconcile(&[ada()], &index);

        match &actions[0] {
            Action::Update { changed_fields, .. } => {
                assert_eq!(changed_fields, &vec![ChangedField::DisplayName]);
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn test_year_compared_only_when_event_has_one() {
        let mut without_year = event_for("c1", "Ada", 12, 10);
        let actions = reconcile(&[ada()], &build_index(vec![without_year.clone()]));
        assert!(actions[0].is_noop());

        without_year.birth_year = Some(1816);
        let actions = reconcile(&[ada()], &build_index(vec![without_year.clone()]));
        match &actions[0] {
            Action::Update { changed_fields, .. } => {
                assert_eq!(changed_fields, &vec![ChangedField::Year]);
            }
            other => panic!("expected update, got {other:?}"),
        }

        without_year.birth_year = Some(1815);
        let actions = reconcile(&[ada()], &build_index(vec![without_year]));
        assert!(actions[0].is_noop());
    }

    #[test]
    fn test_all_changed_fields_are_named_in_order() {
        let mut event = event_for("c1", "Countess", 1, 1);
        event.birth_year = Some(1900);

        let actions = reconcile(&[ada()], &build_index(vec![event]));

        match &actions[0] {
            Action::Update { changed_fields, .. } => assert_eq!(
                changed_fields,
                &vec![
                    ChangedField::Date,
                    ChangedField::Year,
                    ChangedField::DisplayName
                ]
            ),
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn test_legacy_subject_without_prefix_matches() {
        let mut event = event_for("c1", "Ada", 12, 10);
        event.subject = "Ada".to_string();

        let actions = reconcile(&[ada()], &build_index(vec![event]));

        assert!(actions[0].is_noop());
    }

    #[test]
    fn test_orphans_never_produce_actions() {
        let index = build_index(vec![
            event_for("c1", "Ada", 12, 10),
            event_for("gone", "Gone", 3, 3),
        ]);

        let actions = reconcile(&[ada()], &index);
        let orphans = find_orphans(&[ada()], &index);

        assert_eq!(actions.len(), 1);
        assert!(actions.iter().all(|a| a.record().contact_id != "gone"));
        assert!(actions.iter().all(|a| match a {
            Action::Update { event_id, .. } => event_id != "event-gone",
            _ => true,
        }));
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].event_id, "event-gone");
    }

    #[test]
    fn test_output_follows_record_order() {
        let records = vec![
            record("c3", "Alan", 6, 23),
            ada(),
            record("c2", "Grace", 12, 9),
        ];
        let index = build_index(vec![event_for("c1", "Ada", 12, 10)]);

        let first = reconcile(&records, &index);
        let second = reconcile(&records, &index);

        let ids: Vec<_> = first.iter().map(|a| a.record().contact_id.as_str()).collect();
        assert_eq!(ids, vec!["c3", "c1", "c2"]);
        assert_eq!(first, second);
    }
}
