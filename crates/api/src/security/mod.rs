pub mod csrf;
pub mod rate_limit;

use axum::http::HeaderMap;

/// Client IP for rate limiting and audit events. The service sits behind a
/// reverse proxy, so X-Forwarded-For is the primary source.
pub fn client_ip(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    forwarded
        .or_else(real_ip)
        .unwrap_or_else(|| "unknown".to_string())
}
