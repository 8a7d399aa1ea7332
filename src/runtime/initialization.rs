//! # Initialization
//!
//! Controller initialization logic including rustls setup, tracing, metrics,
//! server startup, Kubernetes client setup and the one-time platform probe.

use crate::config::ControllerConfig;
use crate::controller::server::{start_server, ServerState};
use crate::expose::PlatformCapabilities;
use crate::observability;
use anyhow::{Context, Result};
use kube::Client;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Default log filter when `RUST_LOG` is not set
const DEFAULT_LOG_FILTER: &str = "che_exposure_controller=info";

/// Initialization result containing all necessary components for the controller
pub struct InitializationResult {
    /// Kubernetes client
    pub client: Client,
    /// Platform capabilities, probed once
    pub capabilities: PlatformCapabilities,
    /// Server state for health checks
    pub server_state: Arc<ServerState>,
}

impl std::fmt::Debug for InitializationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationResult")
            .field("capabilities", &self.capabilities)
            .field("server_ready", &self.server_state.ready())
            .finish_non_exhaustive()
    }
}

/// Install the ring crypto provider for rustls
///
/// Required for rustls 0.23+ when no default provider is set via features. Must
/// run before any Kubernetes API connection is made.
pub fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }
}

/// Set up the tracing subscriber (`LOG_FORMAT` json or text, filter from `RUST_LOG`)
pub fn init_tracing(log_format: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let result = if log_format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };

    if let Err(e) = result {
        warn!("Tracing subscriber init returned error (may already be initialized): {}", e);
    }
}

/// Initialize the controller runtime
///
/// This function handles:
/// - rustls crypto provider setup
/// - Tracing subscriber setup
/// - Metrics registration
/// - HTTP server startup
/// - Kubernetes client creation
/// - Platform capability detection
///
/// # Errors
///
/// Fails if metrics cannot be registered, no Kubernetes client can be built, or
/// the platform probe fails.
pub async fn initialize(config: &ControllerConfig) -> Result<InitializationResult> {
    install_crypto_provider();
    init_tracing(&config.log_format);

    info!("Starting Che Exposure Controller");
    info!(
        "Build info: datetime={}, git_hash={}",
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );

    observability::metrics::register_metrics()?;

    let server_state = Arc::new(ServerState::default());
    let server_port = config.metrics_port;
    let server_state_clone = Arc::clone(&server_state);
    tokio::spawn(async move {
        if let Err(e) = start_server(server_port, server_state_clone).await {
            error!("HTTP server error: {}", e);
        }
    });

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;

    let capabilities = PlatformCapabilities::detect(&client, &config.probe_settings())
        .await
        .context("Failed to detect platform capabilities")?;

    info!("Controller initialized, starting convergence loop...");

    Ok(InitializationResult {
        client,
        capabilities,
        server_state,
    })
}
