//! OAuth access-token cache.
//!
//! Tokens come from a refresh-token exchange against the regional accounts
//! host. The cached expiry is set five minutes before the real one so a token
//! handed to a slow request cannot expire mid-flight.

use std::time::Duration;

use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use leadgate_core::config::CrmSettings;

use crate::error::CrmError;

/// Safety margin subtracted from the token's advertised lifetime.
const EXPIRY_MARGIN: Duration = Duration::from_secs(300);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
    error_description: Option<String>,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

pub(crate) struct TokenCache {
    token_url: String,
    settings: CrmSettings,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(token_url: String, settings: CrmSettings) -> Self {
        Self {
            token_url,
            settings,
            cached: Mutex::new(None),
        }
    }

    /// Return a valid access token, refreshing through the exchange endpoint
    /// when the cache is empty or past its margin-adjusted expiry.
    pub async fn bearer(&self, http: &reqwest::Client) -> Result<String, CrmError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.access_token.clone());
            }
        }

        debug!("refreshing crm access token");
        let response = http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.settings.refresh_token.as_str()),
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrmError::Token(format!("exchange returned http {}", status)));
        }

        let body: TokenResponse = response.json().await?;
        if let Some(error) = body.error {
            let description = body.error_description.unwrap_or_default();
            return Err(CrmError::Token(format!("{error}: {description}")));
        }
        let access_token = body
            .access_token
            .ok_or_else(|| CrmError::Token("response missing access_token".to_string()))?;
        let expires_in = Duration::from_secs(body.expires_in.unwrap_or(3600));
        let lifetime = expires_in.saturating_sub(EXPIRY_MARGIN);

        *cached = Some(CachedToken {
            access_token: access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(access_token)
    }

    /// Drop the cached token so the next call re-authenticates.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}
