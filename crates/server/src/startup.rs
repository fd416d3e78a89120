use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use configs::{AppConfig, DirectoryConfig, RedisConfig};
use service::{
    directory::DirectoryPolicy,
    storage::{RecordStore, RedisStore},
};
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

/// Map the `[directory]` config section onto the service policy.
pub fn policy_from(cfg: &DirectoryConfig) -> DirectoryPolicy {
    DirectoryPolicy {
        enforce_unique_id: cfg.enforce_unique_id,
        enforce_unique_name: cfg.enforce_unique_name,
        key_prefix: cfg.key_prefix.clone(),
        name_index_prefix: cfg.name_index_prefix.clone(),
    }
}

/// Open the shared Redis connection. A failed initial PING is logged and
/// tolerated; the connection manager reconnects on later commands.
pub async fn connect_store(cfg: &RedisConfig) -> Result<Arc<dyn RecordStore>, StartupError> {
    let timeout = Duration::from_millis(cfg.command_timeout_ms);
    info!(url = %cfg.redacted_url(), timeout_ms = cfg.command_timeout_ms, "connecting to redis");
    let store = RedisStore::connect(&cfg.url(), timeout).await?;
    if let Err(e) = store.ping().await {
        warn!(error = %e, "error attempting to ping redis");
    }
    Ok(Arc::new(store))
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    let raw = cfg.server.bind_addr();
    raw.parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address {raw}: {e}")))
}

/// Router over an already-constructed store; tests inject an in-memory one.
pub fn app(store: Arc<dyn RecordStore>, cfg: &DirectoryConfig) -> Router {
    routes::build_router(AppState::new(store, policy_from(cfg)))
}

/// Connect the store, bind and serve until `shutdown` resolves.
pub async fn run<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = bind_addr(&cfg)?;
    let store = connect_store(&cfg.redis).await?;
    let router = app(store, &cfg.directory);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "hosting directory server");
    axum::serve(listener, router).with_graceful_shutdown(shutdown).await?;
    info!("directory server stopped");
    Ok(())
}
