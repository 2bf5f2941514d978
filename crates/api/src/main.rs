use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

mod audit;
mod dedup;
mod error;
mod middleware;
mod routes;
mod security;
mod state;

use leadgate_core::config::Settings;
use leadgate_core::store::{KvStore, MemoryStore, RedisStore};
use leadgate_crm::CrmClient;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let settings = Settings::from_env().context("missing required environment variables")?;

    let store: Arc<dyn KvStore> = match settings.redis_url.as_deref() {
        Some(url) => {
            info!("using redis store");
            Arc::new(RedisStore::open(url)?)
        }
        None => {
            info!("no redis url configured, using in-process store");
            Arc::new(MemoryStore::new())
        }
    };

    let crm = Arc::new(CrmClient::new(settings.crm.clone())?);

    let addr: SocketAddr = settings.api_bind.parse()?;
    let state = AppState::new(settings, store, crm);
    let app = routes::app(state);

    info!(%addr, "starting api");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
