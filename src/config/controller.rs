//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.

use crate::constants::{
    DEFAULT_BACKOFF_MAX_SECS, DEFAULT_BACKOFF_MIN_SECS, DEFAULT_CHE_CLUSTER_NAME,
    DEFAULT_EXPOSED_ENDPOINTS, DEFAULT_GATEWAY_CONFIG_PREFIX, DEFAULT_IDENTITY_ENDPOINT,
    DEFAULT_METRICS_PORT, DEFAULT_NAMESPACE, DEFAULT_PENDING_REQUEUE_SECS,
    DEFAULT_RESYNC_INTERVAL, DEFAULT_TARGET_PORT, MIN_PASS_DELAY_SECS,
};
use crate::controller::backoff::FibonacciBackoff;
use crate::controller::duration::parse_kubernetes_duration;
use crate::expose::{ExposureSettings, PlatformProbeSettings};
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::warn;

/// Controller-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
/// Environment variables are populated from a ConfigMap using `envFrom` in the deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Namespace of the CheCluster and of every generated object
    pub namespace: String,
    /// Name of the CheCluster resource
    pub checluster_name: String,
    /// Endpoints (service names) to expose
    pub exposed_endpoints: Vec<String>,
    /// Endpoint exposed under the fixed `auth` prefix
    pub identity_endpoint: String,
    /// Port the endpoint services listen on
    pub endpoint_target_port: u16,
    /// Prefix of gateway route ConfigMap names
    pub gateway_config_prefix: String,
    /// Delay between passes once everything converged (Kubernetes duration)
    pub resync_interval: String,
    /// Delay between passes while an endpoint is still converging (seconds)
    pub pending_requeue_secs: u64,
    /// Fibonacci backoff starting value after failed passes (seconds)
    pub backoff_min_secs: u64,
    /// Fibonacci backoff maximum value (seconds)
    pub backoff_max_secs: u64,
    /// Port of the metrics and probe server
    pub metrics_port: u16,
    /// Log format (json, text)
    pub log_format: String,
    /// Offline mode (`MOCK_API`)
    pub test_mode: bool,
    /// OpenShift major version override, honoured in test mode only
    pub openshift_version: Option<String>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            checluster_name: DEFAULT_CHE_CLUSTER_NAME.to_string(),
            exposed_endpoints: parse_endpoint_list(DEFAULT_EXPOSED_ENDPOINTS),
            identity_endpoint: DEFAULT_IDENTITY_ENDPOINT.to_string(),
            endpoint_target_port: DEFAULT_TARGET_PORT,
            gateway_config_prefix: DEFAULT_GATEWAY_CONFIG_PREFIX.to_string(),
            resync_interval: DEFAULT_RESYNC_INTERVAL.to_string(),
            pending_requeue_secs: DEFAULT_PENDING_REQUEUE_SECS,
            backoff_min_secs: DEFAULT_BACKOFF_MIN_SECS,
            backoff_max_secs: DEFAULT_BACKOFF_MAX_SECS,
            metrics_port: DEFAULT_METRICS_PORT,
            log_format: "json".to_string(),
            test_mode: false,
            openshift_version: None,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        let probe = PlatformProbeSettings::from_env();
        Self {
            namespace: env_var_or_default_str("POD_NAMESPACE", DEFAULT_NAMESPACE),
            checluster_name: env_var_or_default_str("CHE_CLUSTER_NAME", DEFAULT_CHE_CLUSTER_NAME),
            exposed_endpoints: parse_endpoint_list(&env_var_or_default_str(
                "EXPOSED_ENDPOINTS",
                DEFAULT_EXPOSED_ENDPOINTS,
            )),
            identity_endpoint: env_var_or_default_str(
                "IDENTITY_ENDPOINT",
                DEFAULT_IDENTITY_ENDPOINT,
            ),
            endpoint_target_port: env_var_or_default("ENDPOINT_TARGET_PORT", DEFAULT_TARGET_PORT),
            gateway_config_prefix: env_var_or_default_str(
                "GATEWAY_CONFIG_PREFIX",
                DEFAULT_GATEWAY_CONFIG_PREFIX,
            ),
            resync_interval: env_var_or_default_str("RESYNC_INTERVAL", DEFAULT_RESYNC_INTERVAL),
            pending_requeue_secs: delay_secs_or_default(
                "PENDING_REQUEUE_SECS",
                DEFAULT_PENDING_REQUEUE_SECS,
            ),
            backoff_min_secs: delay_secs_or_default("BACKOFF_MIN_SECS", DEFAULT_BACKOFF_MIN_SECS),
            backoff_max_secs: delay_secs_or_default("BACKOFF_MAX_SECS", DEFAULT_BACKOFF_MAX_SECS),
            metrics_port: env_var_or_default("METRICS_PORT", DEFAULT_METRICS_PORT),
            log_format: env_var_or_default_str("LOG_FORMAT", "json"),
            test_mode: probe.test_mode,
            openshift_version: probe.openshift_version,
        }
    }

    /// Apply command-line overrides
    #[must_use]
    pub fn with_overrides(mut self, namespace: Option<String>, checluster: Option<String>) -> Self {
        if let Some(namespace) = namespace {
            self.namespace = namespace;
        }
        if let Some(checluster) = checluster {
            self.checluster_name = checluster;
        }
        self
    }

    /// Get resync interval duration
    ///
    /// # Errors
    ///
    /// Fails if `RESYNC_INTERVAL` is not a valid Kubernetes duration.
    pub fn resync_interval_duration(&self) -> Result<Duration> {
        parse_kubernetes_duration(&self.resync_interval)
            .with_context(|| format!("Invalid RESYNC_INTERVAL '{}'", self.resync_interval))
    }

    /// Get pending requeue duration, at least one second
    #[must_use]
    pub fn pending_requeue_duration(&self) -> Duration {
        Duration::from_secs(self.pending_requeue_secs.max(MIN_PASS_DELAY_SECS))
    }

    /// Backoff for failed passes, starting at one second or more
    #[must_use]
    pub fn backoff(&self) -> FibonacciBackoff {
        let min = self.backoff_min_secs.max(MIN_PASS_DELAY_SECS);
        FibonacciBackoff::new(min, self.backoff_max_secs.max(min))
    }

    #[must_use]
    pub fn probe_settings(&self) -> PlatformProbeSettings {
        PlatformProbeSettings {
            test_mode: self.test_mode,
            openshift_version: self.openshift_version.clone(),
        }
    }

    #[must_use]
    pub fn exposure_settings(&self) -> ExposureSettings {
        ExposureSettings {
            test_mode: self.test_mode,
            gateway_config_prefix: self.gateway_config_prefix.clone(),
        }
    }
}

/// Split a comma separated endpoint list, dropping empty entries
fn parse_endpoint_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Read environment variable or return default value
fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T
where
    <T as std::str::FromStr>::Err: std::fmt::Debug,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Read a delay in seconds; zero would make passes run back to back
fn delay_secs_or_default(key: &str, default: u64) -> u64 {
    let secs = env_var_or_default(key, default);
    if secs < MIN_PASS_DELAY_SECS {
        warn!("{} must be at least {}s, using {}s", key, MIN_PASS_DELAY_SECS, MIN_PASS_DELAY_SECS);
        return MIN_PASS_DELAY_SECS;
    }
    secs
}

/// Read environment variable as string or return default
fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
