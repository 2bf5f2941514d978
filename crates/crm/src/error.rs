#[derive(Debug, thiserror::Error)]
pub enum CrmError {
    #[error("token exchange failed: {0}")]
    Token(String),
    #[error("crm returned http {status}")]
    Http { status: u16 },
    #[error("crm rejected the request: {code}: {message}")]
    Envelope { code: String, message: String },
    #[error("crm response missing expected fields")]
    MalformedResponse,
    #[error("crm circuit is open, failing fast")]
    CircuitOpen,
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}
