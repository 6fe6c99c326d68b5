use anyhow::Result;
use birthdays365_core::{SyncContext, Synchronizer};
use owo_colors::OwoColorize;

use super::connect;
use crate::config::AppConfig;
use crate::render::render_plan;
use crate::utils::tui::create_spinner;

/// Show what a sync would change without creating or updating events.
pub async fn run(config: &AppConfig, verbose: bool) -> Result<()> {
    let client = connect(config).await?;
    let context = SyncContext::new(config.sync_options());

    let title = format!("🎂 {}", config.calendar_name);
    let spinner = create_spinner(title.clone());
    let plan = Synchronizer::new(&client, &context).plan().await;
    spinner.finish_and_clear();

    println!("{}", title);
    let plan = plan?;
    println!("{}", render_plan(&plan, verbose));

    if !plan.is_up_to_date() {
        println!(
            "\n{}",
            "Run `birthdays365 sync` to apply these changes.".dimmed()
        );
    }

    Ok(())
}
