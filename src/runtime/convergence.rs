//! # Convergence Loop
//!
//! Drives the exposure core: every pass reads the CheCluster, exposes each
//! configured endpoint in order, records the result in the CheCluster status,
//! and picks the delay before the next pass.
//!
//! The core never sleeps or retries on its own; all timing lives here.

use crate::config::ControllerConfig;
use crate::constants::FIELD_MANAGER;
use crate::controller::backoff::FibonacciBackoff;
use crate::controller::server::ServerState;
use crate::crd::{CheCluster, CheClusterStatus, Condition};
use crate::expose::{
    EndpointRequest, ExposeError, ExposureContext, ExposureMode, Exposer, PlatformCapabilities,
    SyncOutcome,
};
use crate::observability::metrics;
use crate::sync::{KubeObjectSync, ObjectSync};
use anyhow::{Context, Result};
use kube::api::{Api, Patch, PatchParams};
use kube::{Client, Resource};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Condition type recorded on the CheCluster
pub const EXPOSED_CONDITION: &str = "Exposed";

/// Result of one pass over every endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub mode: ExposureMode,
    /// Address of every endpoint that is ready
    pub endpoints: BTreeMap<String, String>,
    /// Endpoints whose objects are still converging
    pub pending: Vec<String>,
    /// Endpoints whose sync failed, with the error message
    pub failed: Vec<(String, String)>,
}

/// Summary of a pass used to pick the next delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    Converged,
    Pending,
    Failed,
}

impl PassReport {
    #[must_use]
    pub fn new(mode: ExposureMode) -> Self {
        Self {
            mode,
            endpoints: BTreeMap::new(),
            pending: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Failures dominate pending endpoints
    #[must_use]
    pub fn outcome(&self) -> PassOutcome {
        if !self.failed.is_empty() {
            PassOutcome::Failed
        } else if !self.pending.is_empty() {
            PassOutcome::Pending
        } else {
            PassOutcome::Converged
        }
    }
}

/// Delay before the next pass
///
/// Failures follow the Fibonacci backoff; anything else resets it. Pending
/// endpoints are re-checked after the short requeue interval, converged
/// passes after the resync interval.
pub fn next_delay(
    outcome: PassOutcome,
    backoff: &mut FibonacciBackoff,
    resync_interval: Duration,
    pending_requeue: Duration,
) -> Duration {
    match outcome {
        PassOutcome::Failed => backoff.next_backoff(),
        PassOutcome::Pending => {
            backoff.reset();
            pending_requeue
        }
        PassOutcome::Converged => {
            backoff.reset();
            resync_interval
        }
    }
}

/// Endpoint requests of one pass, with the custom settings of the CheCluster
///
/// # Errors
///
/// Fails when a configured endpoint name is not a valid DNS label.
pub fn endpoint_requests(
    config: &ControllerConfig,
    cluster: &CheCluster,
) -> Result<Vec<EndpointRequest>, ExposeError> {
    config
        .exposed_endpoints
        .iter()
        .map(|name| -> Result<EndpointRequest, ExposeError> {
            let request = EndpointRequest::new(name.as_str())?
                .with_target_port(config.endpoint_target_port)
                .with_settings(cluster.endpoint_settings(name));
            Ok(if *name == config.identity_endpoint {
                request.identity()
            } else {
                request
            })
        })
        .collect()
}

/// Expose every endpoint, one after the other
pub async fn expose_all<S: ObjectSync + ?Sized>(
    exposer: &Exposer<'_, S>,
    ctx: &ExposureContext,
    requests: &[EndpointRequest],
) -> PassReport {
    let mut report = PassReport::new(ctx.mode());
    for request in requests {
        match exposer.expose(ctx, request).await {
            SyncOutcome::Ready(address) => {
                report.endpoints.insert(request.name().to_string(), address);
            }
            SyncOutcome::Pending => report.pending.push(request.name().to_string()),
            SyncOutcome::Failed(err) => {
                report
                    .failed
                    .push((request.name().to_string(), err.to_string()));
            }
        }
    }
    report
}

/// Status reflecting a pass
///
/// Timestamps are carried over from `previous` unless the recorded state
/// changed, so an unchanged pass yields an identical status.
#[must_use]
pub fn status_for(report: &PassReport, previous: Option<&CheClusterStatus>) -> CheClusterStatus {
    let now = chrono::Utc::now().to_rfc3339();
    let (status, reason, message) = match report.outcome() {
        PassOutcome::Converged => (
            "True",
            "Exposed",
            format!("All {} endpoints are exposed", report.endpoints.len()),
        ),
        PassOutcome::Pending => (
            "False",
            "Pending",
            format!("Waiting for endpoints: {}", report.pending.join(", ")),
        ),
        PassOutcome::Failed => (
            "False",
            "SyncFailed",
            report
                .failed
                .iter()
                .map(|(name, err)| format!("{name}: {err}"))
                .collect::<Vec<_>>()
                .join("; "),
        ),
    };

    let previous_condition = previous.and_then(|s| {
        s.conditions
            .iter()
            .find(|c| c.r#type == EXPOSED_CONDITION)
    });
    let last_transition_time = match previous_condition {
        Some(c) if c.status == status && c.reason.as_deref() == Some(reason) => {
            c.last_transition_time.clone()
        }
        _ => Some(now.clone()),
    };

    let previously_converged = previous_condition.is_some_and(|c| c.status == "True");
    let same_endpoints = previous.is_some_and(|s| s.endpoints == report.endpoints);
    let last_exposure_time = if report.outcome() == PassOutcome::Converged
        && !(previously_converged && same_endpoints)
    {
        Some(now)
    } else {
        previous.and_then(|s| s.last_exposure_time.clone())
    };

    CheClusterStatus {
        exposure_mode: Some(report.mode.as_str().to_string()),
        endpoints: report.endpoints.clone(),
        conditions: vec![Condition {
            r#type: EXPOSED_CONDITION.to_string(),
            status: status.to_string(),
            last_transition_time,
            reason: Some(reason.to_string()),
            message: Some(message),
        }],
        last_exposure_time,
    }
}

async fn patch_status(api: &Api<CheCluster>, name: &str, status: &CheClusterStatus) -> Result<()> {
    let patch = serde_json::json!({ "status": status });
    api.patch_status(
        name,
        &PatchParams::apply(FIELD_MANAGER),
        &Patch::Merge(patch),
    )
    .await
    .with_context(|| format!("Failed to patch status of CheCluster {name}"))?;
    Ok(())
}

/// One pass against the live cluster
async fn run_pass(
    client: &Client,
    api: &Api<CheCluster>,
    config: &ControllerConfig,
    capabilities: PlatformCapabilities,
) -> Result<PassReport> {
    let start = Instant::now();
    let cluster = api.get(&config.checluster_name).await.with_context(|| {
        format!(
            "Failed to get CheCluster {}/{}",
            config.namespace, config.checluster_name
        )
    })?;

    let ctx = ExposureContext::from_cluster(&cluster, &capabilities, &config.namespace);
    let requests = endpoint_requests(config, &cluster)?;
    let sync = KubeObjectSync::new(client.clone(), ctx.namespace.clone())
        .with_owner(cluster.controller_owner_ref(&()));
    let exposer = Exposer::new(&sync, capabilities, config.exposure_settings());

    let report = expose_all(&exposer, &ctx, &requests).await;
    metrics::observe_reconciliation_duration(start.elapsed().as_secs_f64());
    metrics::set_endpoints_exposed(report.endpoints.len());

    let status = status_for(&report, cluster.status.as_ref());
    if cluster.status.as_ref() == Some(&status) {
        debug!("CheCluster status unchanged");
    } else {
        patch_status(api, &config.checluster_name, &status).await?;
    }

    Ok(report)
}

/// Run passes until shutdown
///
/// With `once`, returns after the first pass in which every endpoint was exposed.
///
/// # Errors
///
/// Fails on invalid configuration; errors of a single pass are logged and retried.
pub async fn run(
    client: Client,
    config: ControllerConfig,
    capabilities: PlatformCapabilities,
    server_state: Arc<ServerState>,
    once: bool,
) -> Result<()> {
    let resync_interval = config.resync_interval_duration()?;
    let pending_requeue = config.pending_requeue_duration();
    let mut backoff = config.backoff();
    let api: Api<CheCluster> = Api::namespaced(client.clone(), &config.namespace);

    info!(
        "Exposing {} endpoints of CheCluster {}/{} on {}",
        config.exposed_endpoints.len(),
        config.namespace,
        config.checluster_name,
        capabilities
    );

    loop {
        let outcome = match run_pass(&client, &api, &config, capabilities).await {
            Ok(report) => {
                for (name, err) in &report.failed {
                    warn!("Endpoint '{}' not exposed: {}", name, err);
                }
                match report.outcome() {
                    PassOutcome::Converged => {
                        info!(
                            "✅ All endpoints exposed ({}): {:?}",
                            report.mode, report.endpoints
                        );
                        server_state.mark_ready();
                    }
                    PassOutcome::Pending => {
                        info!("⏳ Waiting for endpoints: {}", report.pending.join(", "));
                    }
                    PassOutcome::Failed => {}
                }
                report.outcome()
            }
            Err(e) => {
                error!("Exposure pass failed: {:#}", e);
                PassOutcome::Failed
            }
        };

        if once && outcome == PassOutcome::Converged {
            return Ok(());
        }

        let delay = next_delay(outcome, &mut backoff, resync_interval, pending_requeue);
        debug!("Next exposure pass in {}s", delay.as_secs());
        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for shutdown signal")?;
                info!("Shutdown signal received, stopping");
                return Ok(());
            }
        }
    }
}
