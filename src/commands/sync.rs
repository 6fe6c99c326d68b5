use anyhow::Result;
use birthdays365_core::{SyncContext, SyncSummary, Synchronizer};

use super::connect;
use crate::config::AppConfig;
use crate::render::{Render, render_plan};
use crate::utils::tui::create_spinner;

pub async fn run(config: &AppConfig, verbose: bool) -> Result<SyncSummary> {
    let client = connect(config).await?;
    let context = SyncContext::new(config.sync_options());
    let mut sync = Synchronizer::new(&client, &context);

    let title = format!("🎂 {}", config.calendar_name);
    let spinner = create_spinner(title.clone());
    let plan = sync.plan().await;
    spinner.finish_and_clear();

    println!("{}", title);
    let plan = plan?;
    println!("{}", render_plan(&plan, verbose));

    let spinner = create_spinner("Syncing".to_string());
    let summary = sync.execute(&plan).await;
    spinner.finish_and_clear();

    println!("\n{}", summary.render());

    Ok(summary)
}
