//! # Che Exposure Controller
//!
//! Keeps the external exposure of Eclipse Che endpoints converged.
//!
//! ## Overview
//!
//! On every pass the controller:
//!
//! 1. **Reads the CheCluster** - exposure strategy, hostnames, TLS and per-endpoint settings
//! 2. **Resolves the exposure mode** - multi-host, single-host through the gateway, or single-host direct
//! 3. **Syncs the active mechanism** - gateway route ConfigMap, OpenShift Route or Ingress
//! 4. **Removes the inactive mechanism** - only once the active one is ready
//! 5. **Records the result** - endpoint addresses and an `Exposed` condition in the CheCluster status
//!
//! The platform (OpenShift or Kubernetes) is probed once at startup.

use anyhow::Result;
use che_exposure_controller::config::ControllerConfig;
use che_exposure_controller::runtime::{convergence, initialization};
use clap::Parser;

/// Che endpoint exposure controller
#[derive(Parser, Debug)]
#[command(name = "che-exposure-controller", version, about, long_about = None)]
struct Args {
    /// Namespace of the CheCluster (overrides POD_NAMESPACE)
    #[arg(long)]
    namespace: Option<String>,

    /// Name of the CheCluster (overrides CHE_CLUSTER_NAME)
    #[arg(long)]
    checluster: Option<String>,

    /// Exit after the first pass in which every endpoint is exposed
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ControllerConfig::from_env().with_overrides(args.namespace, args.checluster);

    let init = initialization::initialize(&config).await?;

    convergence::run(
        init.client,
        config,
        init.capabilities,
        init.server_state,
        args.once,
    )
    .await
}
