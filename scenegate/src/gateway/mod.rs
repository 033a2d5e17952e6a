//! HTTP gateway in front of a [`SceneProvider`].
//!
//! Exposes scene search, scene lookup and tile proxying to map clients:
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /` | `{"uptime": seconds}` |
//! | `GET /scenes?x=&y=&days_ago=` | scene collection |
//! | `GET /scenes/:id` | single scene |
//! | `GET /tiles/:scene_id/:z/:x/:y.png` | PNG tile |
//!
//! Provider calls are blocking and run on the tokio blocking pool.

mod handlers;
pub mod placeholder;

use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::routing::get;
use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

use crate::provider::SceneProvider;

/// Cache lifetime for search results, in seconds.
pub const CACHE_SHORT: u32 = 300;

/// Cache lifetime for scenes and tiles, in seconds.
pub const CACHE_LONG: u32 = 86_400;

/// Search window applied when a request omits `days_ago`.
pub const DEFAULT_DAYS_AGO: i32 = 14;

/// Gateway startup and runtime errors.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Failed to build placeholder tile: {0}")]
    Placeholder(String),

    #[error("Failed to read placeholder tile {path}: {source}")]
    PlaceholderFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// State shared by all request handlers.
#[derive(Clone)]
pub struct GatewayState {
    provider: Arc<dyn SceneProvider>,
    placeholder: Arc<[u8]>,
    started: Instant,
}

impl GatewayState {
    /// Creates state with explicit placeholder bytes.
    ///
    /// The uptime clock starts here.
    pub fn new(provider: Arc<dyn SceneProvider>, placeholder: Vec<u8>) -> Self {
        Self {
            provider,
            placeholder: placeholder.into(),
            started: Instant::now(),
        }
    }

    /// Creates state with the placeholder loaded from `path`, or generated
    /// when no path is given.
    pub fn with_placeholder_file(
        provider: Arc<dyn SceneProvider>,
        path: Option<&Path>,
    ) -> Result<Self, GatewayError> {
        let placeholder = placeholder::load_placeholder(path)?;
        Ok(Self::new(provider, placeholder))
    }

    /// Time since the state was created.
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    /// Bytes served when a tile cannot be proxied.
    pub fn placeholder(&self) -> &[u8] {
        &self.placeholder
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

/// Builds the gateway router.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(handlers::uptime))
        .route("/scenes", get(handlers::search_scenes))
        .route("/scenes/:id", get(handlers::get_scene))
        .route("/tiles/:scene_id/:z/:x/:tile", get(handlers::get_tile))
        .with_state(state)
}

/// Binds a listener on `addr`.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, GatewayError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| GatewayError::Bind { addr, source })
}

/// Serves the gateway on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: GatewayState, shutdown: F) -> Result<(), GatewayError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(
        address = %addr,
        provider = state.provider_name(),
        "Gateway listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Gateway stopped");
    Ok(())
}
