//! Authenticated CRM client.
//!
//! Every outbound call goes circuit breaker -> throttle -> token cache ->
//! HTTP. An open circuit rejects before the throttle, so failing fast never
//! waits on a window slot. Timeouts and non-success statuses count as breaker
//! failures; a 401 additionally drops the cached token so the next call
//! re-authenticates.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;
use tracing::{debug, warn};

use leadgate_core::config::CrmSettings;

use crate::circuit::CircuitBreaker;
use crate::error::CrmError;
use crate::lead::{LeadPayload, LeadRecord, RecordEnvelope, SearchEnvelope};
use crate::region::Region;
use crate::throttle::Throttle;
use crate::token::TokenCache;

/// The orchestrator's seam onto the CRM. Lead search fails open: an upstream
/// search error is indistinguishable from "no match", steering failures
/// toward lead creation instead of blocking the submission.
#[async_trait]
pub trait LeadSync: Send + Sync {
    async fn search_by_email(&self, email: &str) -> Vec<LeadRecord>;
    /// Returns the CRM-assigned lead id.
    async fn create_lead(&self, payload: &LeadPayload) -> Result<String, CrmError>;
    async fn update_lead(&self, id: &str, payload: &LeadPayload) -> Result<(), CrmError>;
}

pub struct CrmClient {
    http: reqwest::Client,
    leads_url: String,
    search_url: String,
    tokens: TokenCache,
    throttle: Throttle,
    breaker: CircuitBreaker,
}

impl CrmClient {
    pub fn new(settings: CrmSettings) -> Result<Self, CrmError> {
        let region = Region::from_base_url(&settings.base_url);
        let base = settings.base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            leads_url: format!("{}/crm/v2/Leads", base),
            search_url: format!("{}/crm/v2/Leads/search", base),
            throttle: Throttle::new(settings.rate_limit_per_sec),
            breaker: CircuitBreaker::default(),
            tokens: TokenCache::new(region.token_url(), settings),
        })
    }

    async fn authorized(&self) -> Result<String, CrmError> {
        self.breaker.check().await?;
        self.throttle.acquire().await;
        match self.tokens.bearer(&self.http).await {
            Ok(token) => Ok(token),
            Err(err) => {
                self.breaker.on_failure().await;
                Err(err)
            }
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, CrmError> {
        match request.send().await {
            Ok(response) => {
                if response.status() == StatusCode::UNAUTHORIZED {
                    self.tokens.invalidate().await;
                }
                Ok(response)
            }
            Err(err) => {
                // Timeouts and transport errors count toward the breaker.
                self.breaker.on_failure().await;
                Err(CrmError::Transport(err))
            }
        }
    }

    async fn try_search(&self, email: &str) -> Result<Vec<LeadRecord>, CrmError> {
        let token = self.authorized().await?;
        let response = self
            .send(
                self.http
                    .get(&self.search_url)
                    .query(&[("criteria", search_criteria(email))])
                    .header("Authorization", format!("Zoho-oauthtoken {token}")),
            )
            .await?;

        let status = response.status();
        // 204: the search matched nothing.
        if status == StatusCode::NO_CONTENT {
            self.breaker.on_success().await;
            return Ok(Vec::new());
        }
        if !status.is_success() {
            self.breaker.on_failure().await;
            return Err(CrmError::Http {
                status: status.as_u16(),
            });
        }
        let envelope: SearchEnvelope = response.json().await.map_err(CrmError::Transport)?;
        self.breaker.on_success().await;
        Ok(envelope.data)
    }

    async fn send_record(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<String>, CrmError> {
        let response = self.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            self.breaker.on_failure().await;
            return Err(CrmError::Http {
                status: status.as_u16(),
            });
        }
        let envelope: RecordEnvelope = response.json().await.map_err(CrmError::Transport)?;
        let Some(result) = envelope.data.into_iter().next() else {
            self.breaker.on_failure().await;
            return Err(CrmError::MalformedResponse);
        };
        if !result.is_success() {
            self.breaker.on_failure().await;
            return Err(CrmError::Envelope {
                code: result.code,
                message: result.message,
            });
        }
        self.breaker.on_success().await;
        Ok(result.details.and_then(|d| d.id))
    }
}

fn search_criteria(email: &str) -> String {
    format!("(Email:equals:{email})")
}

#[async_trait]
impl LeadSync for CrmClient {
    async fn search_by_email(&self, email: &str) -> Vec<LeadRecord> {
        match self.try_search(email).await {
            Ok(leads) => {
                debug!(matches = leads.len(), "lead search completed");
                leads
            }
            Err(err) => {
                warn!(error = %err, "lead search failed, treating as no match");
                Vec::new()
            }
        }
    }

    async fn create_lead(&self, payload: &LeadPayload) -> Result<String, CrmError> {
        let token = self.authorized().await?;
        let body = json!({ "data": [payload], "trigger": [] });
        let id = self
            .send_record(
                self.http
                    .post(&self.leads_url)
                    .json(&body)
                    .header("Authorization", format!("Zoho-oauthtoken {token}")),
            )
            .await?
            .ok_or(CrmError::MalformedResponse)?;
        Ok(id)
    }

    async fn update_lead(&self, id: &str, payload: &LeadPayload) -> Result<(), CrmError> {
        let token = self.authorized().await?;
        let body = json!({ "data": [payload] });
        self.send_record(
            self.http
                .put(format!("{}/{}", self.leads_url, id))
                .json(&body)
                .header("Authorization", format!("Zoho-oauthtoken {token}")),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadgate_core::config::CrmSettings;

    fn settings() -> CrmSettings {
        CrmSettings {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            refresh_token: "refresh".to_string(),
            base_url: "https://www.zohoapis.eu/".to_string(),
            rate_limit_per_sec: 10,
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_endpoint_urls_from_settings() {
        let client = CrmClient::new(settings()).unwrap();
        assert_eq!(client.leads_url, "https://www.zohoapis.eu/crm/v2/Leads");
        assert_eq!(
            client.search_url,
            "https://www.zohoapis.eu/crm/v2/Leads/search"
        );
    }

    #[test]
    fn test_search_criteria_format() {
        assert_eq!(
            search_criteria("jean@acme.fr"),
            "(Email:equals:jean@acme.fr)"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_circuit_rejects_without_throttle_wait() {
        let client = CrmClient::new(settings()).unwrap();
        for _ in 0..5 {
            client.breaker.on_failure().await;
        }
        // Saturate the one-second window; a throttled caller would now have
        // to sleep until the window deadline.
        for _ in 0..10 {
            client.throttle.acquire().await;
        }

        let start = tokio::time::Instant::now();
        let err = client.authorized().await.unwrap_err();
        assert!(matches!(err, CrmError::CircuitOpen));
        // Rejected immediately: no time passed waiting on the window.
        assert_eq!(tokio::time::Instant::now(), start);
    }
}
