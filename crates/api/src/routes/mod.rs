pub mod contact;
pub mod csrf;
pub mod health;

use axum::{middleware::from_fn, Router};

use crate::middleware::request_id::request_id;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(csrf::router(state.clone()))
        .merge(contact::router(state))
        .layer(from_fn(request_id))
}
