pub mod status;
pub mod sync;

use anyhow::{Context, Result};
use birthdays365_graph::{Authenticator, GraphClient};

use crate::config::AppConfig;

/// Sign in and build a Graph client for the configured mailbox.
pub async fn connect(config: &AppConfig) -> Result<GraphClient> {
    let credentials = config.credentials()?;

    let access_token = Authenticator::new(credentials)
        .access_token()
        .await
        .context("Failed to sign in to Microsoft 365")?;
    tracing::info!("Logged in with Microsoft Graph");

    GraphClient::new(&config.graph_base_url, access_token, config.user_target())
}
