//! Serve command - run the HTTP gateway.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use scenegate::config::ConfigFile;
use scenegate::gateway::{self, GatewayState};
use scenegate::provider::SceneProvider;
use tokio::sync::Notify;
use tracing::info;

use super::common::CliRunner;
use crate::error::CliError;

/// Arguments for the serve command.
#[derive(Debug, Default)]
pub struct ServeArgs {
    pub bind: Option<SocketAddr>,
    pub api_key: Option<String>,
}

impl ServeArgs {
    /// Applies CLI flags on top of the loaded configuration.
    pub fn apply(&self, config: &mut ConfigFile) {
        if let Some(bind) = self.bind {
            config.server.bind = bind;
        }
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            config.planet.api_key = Some(key.to_string());
        }
    }
}

/// Run the serve command.
pub fn run(config_path: Option<&Path>, args: ServeArgs) -> Result<(), CliError> {
    let mut runner = CliRunner::new(config_path)?;
    args.apply(runner.config_mut());
    runner.log_startup("serve");

    let config = runner.config();
    let bind = config.server.bind;

    // Built before the runtime exists: the blocking client must not be
    // created or dropped from async context.
    let provider: Arc<dyn SceneProvider> = Arc::new(runner.create_client()?);
    let state = GatewayState::with_placeholder_file(
        Arc::clone(&provider),
        config.server.tile_error_image.as_deref(),
    )?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(format!("Failed to create Tokio runtime: {}", e)))?;

    let shutdown = Arc::new(Notify::new());
    let signal = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        signal.notify_one();
    })
    .map_err(|e| CliError::Runtime(format!("Failed to set signal handler: {}", e)))?;

    println!("SceneGate v{}", env!("CARGO_PKG_VERSION"));
    println!("Listening on http://{}", bind);
    println!("Press Ctrl+C to stop");

    runtime.block_on(async move {
        let listener = gateway::bind(bind).await?;
        gateway::serve(listener, state, async move { shutdown.notified().await }).await
    })?;

    drop(runtime);
    drop(provider);
    Ok(())
}
