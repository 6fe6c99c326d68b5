//! OAuth2 against the Microsoft identity platform.
//!
//! Two ways to get a Graph access token:
//! - a client secret (app-only, client-credentials grant), for unattended runs
//! - the device-code flow (delegated), with the session cached on disk and
//!   refreshed on later runs

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;

use crate::session::Session;

pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

const APP_SCOPE: &str = "https://graph.microsoft.com/.default";
const DELEGATED_SCOPE: &str = "https://graph.microsoft.com/.default offline_access";
const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";

#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub tenant_id: String,
    pub client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct OAuthError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(description) => write!(f, "{}: {}", self.error, description),
            None => f.write_str(&self.error),
        }
    }
}

enum TokenReply {
    Granted(TokenResponse),
    Rejected(OAuthError),
}

#[derive(Debug, Deserialize)]
struct DeviceCode {
    device_code: String,
    user_code: String,
    verification_uri: String,
    expires_in: i64,
    #[serde(default = "default_interval")]
    interval: u64,
    #[serde(default)]
    message: Option<String>,
}

fn default_interval() -> u64 {
    5
}

pub struct Authenticator {
    http: reqwest::Client,
    authority: String,
    credentials: Credentials,
    session_path: Option<PathBuf>,
    open_browser: bool,
}

impl Authenticator {
    pub fn new(credentials: Credentials) -> Self {
        Authenticator {
            http: reqwest::Client::new(),
            authority: DEFAULT_AUTHORITY.to_string(),
            credentials,
            session_path: None,
            open_browser: true,
        }
    }

    pub fn with_authority(mut self, authority: &str) -> Self {
        self.authority = authority.trim_end_matches('/').to_string();
        self
    }

    pub fn with_session_path(mut self, path: PathBuf) -> Self {
        self.session_path = Some(path);
        self
    }

    /// Only print the device-code prompt.
    pub fn without_browser(mut self) -> Self {
        self.open_browser = false;
        self
    }

    pub fn uses_client_secret(&self) -> bool {
        self.credentials.client_secret.is_some()
    }

    fn endpoint(&self, name: &str) -> String {
        format!(
            "{}/{}/oauth2/v2.0/{}",
            self.authority, self.credentials.tenant_id, name
        )
    }

    pub async fn access_token(&self) -> Result<String> {
        match &self.credentials.client_secret {
            Some(secret) => {
                tracing::info!("Using client secret authentication");
                self.client_credentials(secret).await
            }
            None => {
                tracing::info!("Using device code authentication");
                self.delegated().await
            }
        }
    }

    async fn client_credentials(&self, secret: &str) -> Result<String> {
        let reply = self
            .post_token(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", secret),
                ("scope", APP_SCOPE),
            ])
            .await?;

        match reply {
            TokenReply::Granted(tokens) => Ok(tokens.access_token),
            TokenReply::Rejected(err) => anyhow::bail!("Client secret sign-in failed: {err}"),
        }
    }

    async fn delegated(&self) -> Result<String> {
        let path = match &self.session_path {
            Some(path) => path.clone(),
            None => Session::default_path()?,
        };

        let cached = match Session::load(&path) {
            Ok(session) => session.filter(|s| {
                s.belongs_to(&self.credentials.client_id, &self.credentials.tenant_id)
            }),
            Err(err) => {
                tracing::warn!(error = %err, "Ignoring unreadable session cache");
                None
            }
        };

        if let Some(session) = cached {
            if !session.is_expired() {
                tracing::debug!("Using cached session");
                return Ok(session.access_token);
            }

            if let Some(refresh_token) = &session.refresh_token {
                match self.refresh(refresh_token).await {
                    Ok(refreshed) => {
                        refreshed.save(&path)?;
                        return Ok(refreshed.access_token);
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "Session refresh failed, signing in again");
                    }
                }
            }
        }

        let session = self.device_code_flow().await?;
        session.save(&path)?;
        Ok(session.access_token)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session> {
        let reply = self
            .post_token(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.credentials.client_id.as_str()),
                ("refresh_token", refresh_token),
                ("scope", DELEGATED_SCOPE),
            ])
            .await?;

        match reply {
            TokenReply::Granted(tokens) => Ok(Session::new(
                &self.credentials.client_id,
                &self.credentials.tenant_id,
                tokens.access_token,
                // Not every refresh returns a new refresh token
                tokens.refresh_token.or_else(|| Some(refresh_token.to_string())),
                tokens.expires_in,
            )),
            TokenReply::Rejected(err) => anyhow::bail!("Token refresh rejected: {err}"),
        }
    }

    async fn device_code_flow(&self) -> Result<Session> {
        let response = self
            .http
            .post(self.endpoint("devicecode"))
            .form(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("scope", DELEGATED_SCOPE),
            ])
            .send()
            .await
            .context("Failed to request a device code")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Device code request failed ({status}): {error_text}");
        }

        let code: DeviceCode = response
            .json()
            .await
            .context("Failed to parse device code response")?;

        let prompt = code.message.clone().unwrap_or_else(|| {
            format!(
                "To sign in, open {} and enter the code {}",
                code.verification_uri, code.user_code
            )
        });
        eprintln!("\n{prompt}\n");

        if self.open_browser && open::that(&code.verification_uri).is_err() {
            eprintln!("(Could not open browser automatically, please open the URL above)");
        }

        let deadline = Utc::now() + chrono::Duration::seconds(code.expires_in);
        let mut interval = code.interval;

        loop {
            tokio::time::sleep(std::time::Duration::from_secs(interval)).await;

            let reply = self
                .post_token(&[
                    ("grant_type", DEVICE_CODE_GRANT),
                    ("client_id", self.credentials.client_id.as_str()),
                    ("device_code", code.device_code.as_str()),
                ])
                .await?;

            match reply {
                TokenReply::Granted(tokens) => {
                    return Ok(Session::new(
                        &self.credentials.client_id,
                        &self.credentials.tenant_id,
                        tokens.access_token,
                        tokens.refresh_token,
                        tokens.expires_in,
                    ));
                }
                TokenReply::Rejected(err) if err.error == "authorization_pending" => {}
                TokenReply::Rejected(err) if err.error == "slow_down" => interval += 5,
                TokenReply::Rejected(err) => anyhow::bail!("Device code sign-in failed: {err}"),
            }

            if Utc::now() >= deadline {
                anyhow::bail!("Device code expired before sign-in completed");
            }
        }
    }

    async fn post_token(&self, form: &[(&str, &str)]) -> Result<TokenReply> {
        let response = self
            .http
            .post(self.endpoint("token"))
            .form(form)
            .send()
            .await
            .context("Failed to reach the Microsoft identity platform")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read token response")?;

        if status.is_success() {
            let tokens = serde_json::from_str(&body).context("Failed to parse token response")?;
            return Ok(TokenReply::Granted(tokens));
        }

        match serde_json::from_str::<OAuthError>(&body) {
            Ok(err) => Ok(TokenReply::Rejected(err)),
            Err(_) => anyhow::bail!("Token request failed ({status}): {body}"),
        }
    }
}
