//! Application configuration.
//!
//! Sources, lowest precedence first:
//! 1. `{config_dir}/birthdays365/config.toml`
//! 2. environment variables (a `.env` file is loaded into the environment first)
//! 3. command-line overrides

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use birthdays365_core::context::{DEFAULT_CALENDAR_NAME, DEFAULT_REMINDER_MINUTES_BEFORE_START};
use birthdays365_core::{ReminderOptions, SyncOptions};
use birthdays365_graph::{Credentials, DEFAULT_BASE_URL, UserTarget};
use config::{Config, Environment, File, Map};
use serde::Deserialize;

/// Environment variables read into the config, matched to keys by lowercasing.
const ENV_KEYS: &[&str] = &[
    "CLIENT_ID",
    "TENANT_ID",
    "CLIENT_SECRET",
    "CALENDAR_NAME",
    "TARGET_USER_UPN",
    "REMINDER",
    "REMINDER_MINUTES_BEFORE_START",
    "GRAPH_BASE_URL",
];

const SETUP_HELP: &str = "\
Please ensure you have:
1. Set CLIENT_ID and TENANT_ID (in the environment, a .env file or the config file)
2. Registered an app in Microsoft Entra (Azure AD)
3. Granted the following API permissions:
   - Calendars.ReadWrite (Delegated)
   - Contacts.Read (Delegated)
   - User.Read (Delegated)";

fn default_calendar_name() -> String {
    DEFAULT_CALENDAR_NAME.to_string()
}

fn default_reminder() -> bool {
    true
}

fn default_reminder_minutes() -> i32 {
    DEFAULT_REMINDER_MINUTES_BEFORE_START
}

fn default_graph_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub client_id: Option<String>,
    pub tenant_id: Option<String>,
    pub client_secret: Option<String>,

    #[serde(default = "default_calendar_name")]
    pub calendar_name: String,

    /// Mailbox to sync instead of the signed-in user.
    pub target_user_upn: Option<String>,

    #[serde(default = "default_reminder")]
    pub reminder: bool,

    #[serde(default = "default_reminder_minutes")]
    pub reminder_minutes_before_start: i32,

    #[serde(default = "default_graph_base_url")]
    pub graph_base_url: String,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub calendar: Option<String>,
    pub user: Option<String>,
    pub no_reminder: bool,
}

impl AppConfig {
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("birthdays365");

        Ok(config_dir.join("config.toml"))
    }

    pub fn load(overrides: &Overrides) -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }

        let config_path = Self::config_path()?;
        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        let env: Map<String, String> = ENV_KEYS
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)))
            .collect();

        Self::load_from(&config_path, env, overrides)
    }

    pub fn load_from(
        config_path: &Path,
        env: Map<String, String>,
        overrides: &Overrides,
    ) -> Result<Self> {
        let config: AppConfig = Config::builder()
            .add_source(File::from(config_path).required(false))
            .add_source(Environment::default().source(Some(env)).ignore_empty(true))
            .set_override_option("calendar_name", overrides.calendar.clone())?
            .set_override_option("target_user_upn", overrides.user.clone())?
            .set_override_option("reminder", overrides.no_reminder.then_some(false))?
            .build()
            .with_context(|| format!("Could not read configuration from {}", config_path.display()))?
            .try_deserialize()
            .context("Invalid configuration")?;

        Ok(config)
    }

    /// Create a config file with all options commented out.
    pub fn create_default_config(path: &Path) -> Result<()> {
        let contents = format!(
            "\
# birthdays365 configuration
# Environment variables of the same name in upper case take precedence.

# App registration in Microsoft Entra:
# client_id = \"00000000-0000-0000-0000-000000000000\"
# tenant_id = \"00000000-0000-0000-0000-000000000000\"

# Set for unattended runs (requires target_user_upn):
# client_secret = \"...\"

# Calendar holding the birthday events:
# calendar_name = \"{DEFAULT_CALENDAR_NAME}\"

# Sync another mailbox than the signed-in user's:
# target_user_upn = \"someone@example.com\"

# Reminder on each birthday (negative = after the all-day event starts):
# reminder = true
# reminder_minutes_before_start = {DEFAULT_REMINDER_MINUTES_BEFORE_START}
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Could not create config directory")?;
        }

        std::fs::write(path, contents)
            .with_context(|| format!("Could not write config file {}", path.display()))?;

        Ok(())
    }

    pub fn credentials(&self) -> Result<Credentials> {
        let (Some(client_id), Some(tenant_id)) = (&self.client_id, &self.tenant_id) else {
            anyhow::bail!(
                "Configuration error: missing CLIENT_ID or TENANT_ID.\n\n{}",
                SETUP_HELP
            );
        };

        if self.client_secret.is_some() && self.target_user_upn.is_none() {
            anyhow::bail!(
                "Configuration error: CLIENT_SECRET authenticates as the app itself, \
                 so TARGET_USER_UPN must name the mailbox to sync."
            );
        }

        Ok(Credentials {
            client_id: client_id.clone(),
            tenant_id: tenant_id.clone(),
            client_secret: self.client_secret.clone(),
        })
    }

    pub fn user_target(&self) -> UserTarget {
        UserTarget::from_upn(self.target_user_upn.as_deref())
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            calendar_name: self.calendar_name.clone(),
            reminder: ReminderOptions {
                enabled: self.reminder,
                minutes_before_start: self.reminder_minutes_before_start,
            },
        }
    }
}
