//! Colored terminal rendering for sync plans and summaries.

use birthdays365_core::{Action, BirthdayRecord, EventDate, SyncPlan, SyncSummary};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

fn render_date(record: &BirthdayRecord) -> String {
    let date = EventDate {
        month: record.month,
        day: record.day,
    };
    match record.year {
        Some(year) => format!("{year}-{date}"),
        None => date.to_string(),
    }
}

impl Render for Action {
    fn render(&self) -> String {
        let record = self.record();
        let date = render_date(record);

        match self {
            Action::Create(_) => format!(
                "{} {} {}",
                self.symbol().green(),
                record.display_name.green(),
                date.dimmed()
            ),
            Action::Update { changed_fields, .. } => {
                let changed = changed_fields
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "{} {} {} {}",
                    self.symbol().yellow(),
                    record.display_name.yellow(),
                    date.dimmed(),
                    format!("({changed})").dimmed()
                )
            }
            Action::NoOp(_) => format!(
                "{} {} {}",
                self.symbol().dimmed(),
                record.display_name.dimmed(),
                date.dimmed()
            ),
        }
    }
}

/// Above this many changes, list counts instead of contacts.
const COMPACT_THRESHOLD: usize = 10;

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

/// Render a plan. Unchanged contacts are only listed when `verbose`.
pub fn render_plan(plan: &SyncPlan, verbose: bool) -> String {
    let mut lines = Vec::new();

    let pending: Vec<&Action> = plan.pending().collect();
    let unchanged = plan.actions.len() - pending.len();

    if pending.is_empty() {
        lines.push("   Calendar is up to date".dimmed().to_string());
    } else if verbose || pending.len() <= COMPACT_THRESHOLD {
        lines.extend(pending.iter().map(|action| format!("   {}", action.render())));
    } else {
        let creates = pending
            .iter()
            .filter(|a| matches!(a, Action::Create(_)))
            .count();
        let updates = pending.len() - creates;

        if creates > 0 {
            let label = format!("({} new {})", creates, pluralize("birthday", creates));
            lines.push(format!("   {} {}", "+".green(), label.green()));
        }
        if updates > 0 {
            let label = format!("({} changed {})", updates, pluralize("birthday", updates));
            lines.push(format!("   {} {}", "~".yellow(), label.yellow()));
        }
    }

    if verbose {
        lines.extend(
            plan.actions
                .iter()
                .filter(|a| a.is_noop())
                .map(|action| format!("   {}", action.render())),
        );
    } else if unchanged > 0 && !pending.is_empty() {
        let label = format!("({} unchanged)", unchanged);
        lines.push(format!("   {}", label.dimmed()));
    }

    for orphan in &plan.orphans {
        lines.push(format!(
            "   {} {} {}",
            "?".red(),
            orphan.subject.red(),
            "(contact gone, left in place)".dimmed()
        ));
    }

    if !plan.duplicates.is_empty() {
        let label = format!(
            "{} duplicate {} ignored",
            plan.duplicates.len(),
            pluralize("event", plan.duplicates.len())
        );
        lines.push(format!("   {} {}", "!".yellow(), label.yellow()));
    }

    if plan.untracked > 0 {
        let label = format!(
            "{} other {} in the calendar left alone",
            plan.untracked,
            pluralize("event", plan.untracked)
        );
        lines.push(format!("   {}", label.dimmed()));
    }

    lines.join("\n")
}

impl Render for SyncSummary {
    fn render(&self) -> String {
        let mut parts = vec![
            format!("{} created", self.created).green().to_string(),
            format!("{} updated", self.updated).yellow().to_string(),
            format!("{} unchanged", self.skipped).dimmed().to_string(),
        ];
        if self.failed > 0 {
            parts.push(format!("{} failed", self.failed).red().to_string());
        }

        let mut lines = vec![parts.join(", ")];
        for (contact_id, kind) in &self.failures {
            lines.push(format!(
                "   {} {} {}",
                "✗".red(),
                contact_id,
                format!("({kind})").dimmed()
            ));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use birthdays365_core::{ChangedField, ErrorKind};

    fn record(name: &str, year: Option<i32>) -> BirthdayRecord {
        BirthdayRecord {
            contact_id: format!("id-{name}"),
            display_name: name.to_string(),
            month: 5,
            day: 7,
            year,
        }
    }

    fn plan(actions: Vec<Action>) -> SyncPlan {
        SyncPlan {
            calendar_id: "cal".to_string(),
            records: actions.iter().map(|a| a.record().clone()).collect(),
            actions,
            orphans: Vec::new(),
            duplicates: Vec::new(),
            untracked: 0,
        }
    }

    #[test]
    fn test_render_action_shows_date_and_changes() {
        let rendered = Action::Create(record("Ada", Some(1815))).render();
        assert!(rendered.contains("Ada"));
        assert!(rendered.contains("1815-05-07"));

        let rendered = Action::Update {
            record: record("Ada", None),
            event_id: "e1".to_string(),
            changed_fields: vec![ChangedField::Date, ChangedField::DisplayName],
        }
        .render();
        assert!(rendered.contains("05-07"));
        assert!(rendered.contains("(date, name)"));
    }

    #[test]
    fn test_plan_up_to_date() {
        let rendered = render_plan(&plan(vec![Action::NoOp(record("Ada", None))]), false);
        assert!(rendered.contains("up to date"));
        assert!(!rendered.contains("Ada"));

        let rendered = render_plan(&plan(vec![Action::NoOp(record("Ada", None))]), true);
        assert!(rendered.contains("Ada"));
    }

    #[test]
    fn test_plan_compact_view() {
        let actions = (0..12)
            .map(|i| Action::Create(record(&format!("Person {i}"), None)))
            .chain(std::iter::once(Action::NoOp(record("Same", None))))
            .collect();

        let rendered = render_plan(&plan(actions), false);

        assert!(rendered.contains("(12 new birthdays)"));
        assert!(rendered.contains("(1 unchanged)"));
        assert!(!rendered.contains("Person 3"));
    }

    #[test]
    fn test_summary_lists_failures() {
        let summary = SyncSummary {
            created: 2,
            updated: 1,
            skipped: 4,
            failed: 1,
            failures: vec![("c9".to_string(), ErrorKind::Service(500))],
        };

        let rendered = summary.render();

        assert!(rendered.contains("2 created"));
        assert!(rendered.contains("1 failed"));
        assert!(rendered.contains("c9"));
        assert!(rendered.contains("service (500)"));
    }
}
