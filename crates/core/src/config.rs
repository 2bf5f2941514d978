use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api_bind: String,
    pub env: String,
    pub redis_url: Option<String>,
    pub csrf_secret: String,
    pub csrf_ttl_secs: u64,
    pub contact_rate_limit: u32,
    pub contact_rate_window_secs: u64,
    pub dedup_ttl_secs: u64,
    pub crm: CrmSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrmSettings {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub base_url: String,
    pub rate_limit_per_sec: u32,
    pub timeout_secs: u64,
}

impl Settings {
    pub fn is_production(&self) -> bool {
        self.env == "production"
    }

    pub fn from_env() -> Result<Self, std::env::VarError> {
        let api_bind =
            std::env::var("LEADGATE_API_BIND").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let env = std::env::var("LEADGATE_ENV").unwrap_or_else(|_| "development".to_string());
        let redis_url = std::env::var("LEADGATE_REDIS_URL")
            .or_else(|_| std::env::var("REDIS_URL"))
            .ok();
        let csrf_secret =
            std::env::var("LEADGATE_CSRF_SECRET").or_else(|_| std::env::var("CSRF_SECRET"))?;
        let csrf_ttl_secs = std::env::var("LEADGATE_CSRF_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600);
        let contact_rate_limit = std::env::var("LEADGATE_CONTACT_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);
        let contact_rate_window_secs = std::env::var("LEADGATE_CONTACT_RATE_WINDOW_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600);
        let dedup_ttl_secs = std::env::var("LEADGATE_DEDUP_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);

        let crm = CrmSettings {
            client_id: std::env::var("LEADGATE_CRM_CLIENT_ID")
                .or_else(|_| std::env::var("CRM_CLIENT_ID"))?,
            client_secret: std::env::var("LEADGATE_CRM_CLIENT_SECRET")
                .or_else(|_| std::env::var("CRM_CLIENT_SECRET"))?,
            refresh_token: std::env::var("LEADGATE_CRM_REFRESH_TOKEN")
                .or_else(|_| std::env::var("CRM_REFRESH_TOKEN"))?,
            base_url: std::env::var("LEADGATE_CRM_BASE_URL")
                .or_else(|_| std::env::var("CRM_BASE_URL"))?,
            rate_limit_per_sec: std::env::var("LEADGATE_CRM_RATE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            timeout_secs: std::env::var("LEADGATE_CRM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        };

        Ok(Self {
            api_bind,
            env,
            redis_url,
            csrf_secret,
            csrf_ttl_secs,
            contact_rate_limit,
            contact_rate_window_secs,
            dedup_ttl_secs,
            crm,
        })
    }
}
