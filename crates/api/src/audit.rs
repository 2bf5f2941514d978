//! Structured audit events.
//!
//! Security rejections and submission outcomes are logged with categories and
//! field lengths only; raw payload values (name, email, phone) never reach
//! the log stream.

use tracing::{info, warn};

pub fn security_rejection(request_id: &str, client_ip: &str, kind: &str, detail: &str) {
    warn!(
        target: "audit",
        request_id,
        client_ip,
        kind,
        detail,
        "submission rejected"
    );
}

pub fn submission_outcome(
    request_id: &str,
    client_ip: &str,
    outcome: &str,
    lead_id: Option<&str>,
    email_len: usize,
    phone_len: usize,
) {
    info!(
        target: "audit",
        request_id,
        client_ip,
        outcome,
        lead_id = lead_id.unwrap_or("-"),
        email_len,
        phone_len,
        "submission processed"
    );
}

pub fn token_issued(request_id: &str, client_ip: &str) {
    info!(target: "audit", request_id, client_ip, "csrf token issued");
}
