//! CSRF gate: double-submit mitigation, not authentication.
//!
//! Tokens are minted on request and stored with a TTL. Validation is
//! destructive: a valid token is removed from the store on first use, so
//! expired, consumed and forged tokens are indistinguishable to the caller.

use std::sync::Arc;
use std::time::Duration;

use leadgate_core::csrf::{mint_token, verify_tag};
use leadgate_core::store::{KvStore, StoreError};

#[derive(Clone)]
pub struct CsrfGate {
    store: Arc<dyn KvStore>,
    secret: String,
    ttl: Duration,
}

fn store_key(token: &str) -> String {
    format!("csrf:{token}")
}

impl CsrfGate {
    pub fn new(store: Arc<dyn KvStore>, secret: String, ttl: Duration) -> Self {
        Self { store, secret, ttl }
    }

    pub async fn issue(&self) -> Result<String, StoreError> {
        let token = mint_token(&self.secret);
        self.store.put(&store_key(&token), "1", self.ttl).await?;
        Ok(token)
    }

    /// True exactly once per issued, unexpired token. The tag check rejects
    /// forged tokens without a store round-trip.
    pub async fn consume(&self, token: &str) -> Result<bool, StoreError> {
        if !verify_tag(&self.secret, token) {
            return Ok(false);
        }
        Ok(self.store.take(&store_key(token)).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadgate_core::store::MemoryStore;

    fn gate() -> CsrfGate {
        CsrfGate::new(
            Arc::new(MemoryStore::new()),
            "seed".to_string(),
            Duration::from_secs(3600),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_issued_token_consumes_once() {
        let gate = gate();
        let token = gate.issue().await.unwrap();
        assert!(gate.consume(&token).await.unwrap());
        assert!(!gate.consume(&token).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_token_rejected() {
        let gate = gate();
        let token = gate.issue().await.unwrap();
        tokio::time::advance(Duration::from_secs(3601)).await;
        assert!(!gate.consume(&token).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_forged_token_rejected() {
        let gate = gate();
        assert!(!gate.consume("csrf_forged.deadbeef").await.unwrap());
        assert!(!gate.consume("").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_minted_elsewhere_with_same_secret_but_never_issued() {
        let gate = gate();
        // Valid tag, but never stored: still rejected.
        let token = mint_token("seed");
        assert!(!gate.consume(&token).await.unwrap());
    }
}
