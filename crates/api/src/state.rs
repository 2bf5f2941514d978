use std::sync::Arc;
use std::time::Duration;

use leadgate_core::config::Settings;
use leadgate_core::store::KvStore;
use leadgate_crm::LeadSync;

use crate::dedup::DedupCache;
use crate::security::csrf::CsrfGate;
use crate::security::rate_limit::ContactRateLimiter;

/// Per-request id assigned by the request-id middleware.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub crm: Arc<dyn LeadSync>,
    pub csrf: CsrfGate,
    pub limiter: ContactRateLimiter,
    pub dedup: DedupCache,
}

impl AppState {
    pub fn new(settings: Settings, store: Arc<dyn KvStore>, crm: Arc<dyn LeadSync>) -> Self {
        let csrf = CsrfGate::new(
            store.clone(),
            settings.csrf_secret.clone(),
            Duration::from_secs(settings.csrf_ttl_secs),
        );
        let limiter = ContactRateLimiter::new(
            store.clone(),
            settings.contact_rate_limit,
            Duration::from_secs(settings.contact_rate_window_secs),
        );
        let dedup = DedupCache::new(store, Duration::from_secs(settings.dedup_ttl_secs));
        Self {
            settings: Arc::new(settings),
            crm,
            csrf,
            limiter,
            dedup,
        }
    }
}
