//! Per-request correlation id.
//!
//! Every audit event carries this id, so a single submission can be traced
//! from the security gate through the CRM exchange to the response. The
//! reverse proxy may supply its own id; anything unusable is replaced.

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use nanoid::nanoid;

use crate::state::RequestId;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream id accepted before minting a fresh one.
const MAX_UPSTREAM_ID_LEN: usize = 64;

pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= MAX_UPSTREAM_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(|| format!("req_{}", nanoid!(16)));

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut resp = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        resp.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    resp
}
