//! # Exposure Strategy Resolution
//!
//! Turns cluster-wide configuration plus platform capabilities into the
//! [`ExposureMode`] of an endpoint. Resolution is a pure function: the same
//! [`ExposureConfig`] always yields the same mode.

use crate::constants::{
    DEFAULT_SERVER_EXPOSURE_STRATEGY, DEFAULT_SINGLE_HOST_EXPOSURE_TYPE,
    GATEWAY_SINGLE_HOST_EXPOSURE_TYPE,
};
use crate::crd::CheCluster;
use crate::expose::PlatformCapabilities;

/// Cluster-wide exposure strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExposureStrategy {
    /// Every endpoint gets its own hostname
    #[default]
    MultiHost,
    /// All endpoints share one hostname and are told apart by path
    SingleHost,
}

impl ExposureStrategy {
    /// Parse a strategy value
    ///
    /// Only `single-host` selects single-host; empty and unrecognized values
    /// fall back to multi-host.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "single-host" => Self::SingleHost,
            _ => Self::MultiHost,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MultiHost => "multi-host",
            Self::SingleHost => "single-host",
        }
    }
}

/// How one endpoint is made reachable from outside the cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExposureMode {
    /// Own hostname `<endpoint>-<namespace>.<domain>`, own Route/Ingress
    MultiHost,
    /// Shared hostname, routed by path through the shared gateway
    SingleHostGateway,
    /// Shared hostname, own Route/Ingress with a path prefix
    SingleHostDirect,
}

impl ExposureMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MultiHost => "multi-host",
            Self::SingleHostGateway => "single-host-gateway",
            Self::SingleHostDirect => "single-host-direct",
        }
    }

    /// Whether the endpoint goes through a gateway route entry rather than
    /// its own Route/Ingress object
    #[must_use]
    pub fn uses_gateway(&self) -> bool {
        matches!(self, Self::SingleHostGateway)
    }

    #[must_use]
    pub fn is_single_host(&self) -> bool {
        !matches!(self, Self::MultiHost)
    }
}

impl std::fmt::Display for ExposureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable per-reconciliation exposure input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExposureConfig {
    pub strategy: ExposureStrategy,
    /// Single-host mode routes through the shared gateway instead of one
    /// direct object per endpoint
    pub single_host_gateway_enabled: bool,
    /// Route-capable platform (OpenShift)
    pub platform_capable: bool,
}

impl ExposureConfig {
    /// Read the exposure settings of a CheCluster
    ///
    /// On OpenShift the strategy comes from `server.serverExposureStrategy` and
    /// the gateway is always used in single-host mode. On Kubernetes an unset
    /// server strategy falls back to `k8s.ingressStrategy`, and the gateway is
    /// only used when `k8s.singleHostExposureType` is `gateway`.
    #[must_use]
    pub fn from_cluster(cluster: &CheCluster, capabilities: &PlatformCapabilities) -> Self {
        let server = non_empty(cluster.spec.server.server_exposure_strategy.as_deref());
        let strategy = if capabilities.is_openshift() {
            server
        } else {
            server.or_else(|| non_empty(cluster.spec.k8s.ingress_strategy.as_deref()))
        };

        let single_host_gateway_enabled = capabilities.is_openshift()
            || non_empty(cluster.spec.k8s.single_host_exposure_type.as_deref())
                .unwrap_or(DEFAULT_SINGLE_HOST_EXPOSURE_TYPE)
                == GATEWAY_SINGLE_HOST_EXPOSURE_TYPE;

        Self {
            strategy: ExposureStrategy::parse(strategy.unwrap_or(DEFAULT_SERVER_EXPOSURE_STRATEGY)),
            single_host_gateway_enabled,
            platform_capable: capabilities.is_openshift(),
        }
    }
}

/// Compute the exposure mode
///
/// OpenShift is always forced through the gateway in single-host mode because
/// its routes cannot cheaply share one hostname across path prefixes.
#[must_use]
pub fn resolve_mode(config: &ExposureConfig) -> ExposureMode {
    match config.strategy {
        ExposureStrategy::MultiHost => ExposureMode::MultiHost,
        ExposureStrategy::SingleHost
            if config.platform_capable || config.single_host_gateway_enabled =>
        {
            ExposureMode::SingleHostGateway
        }
        ExposureStrategy::SingleHost => ExposureMode::SingleHostDirect,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::CheClusterSpec;

    fn cluster(server: Option<&str>, ingress: Option<&str>, exposure_type: Option<&str>) -> CheCluster {
        let mut spec = CheClusterSpec::default();
        spec.server.server_exposure_strategy = server.map(String::from);
        spec.k8s.ingress_strategy = ingress.map(String::from);
        spec.k8s.single_host_exposure_type = exposure_type.map(String::from);
        CheCluster::new("eclipse-che", spec)
    }

    #[test]
    fn test_parse_defaults_to_multi_host() {
        assert_eq!(ExposureStrategy::parse("single-host"), ExposureStrategy::SingleHost);
        assert_eq!(ExposureStrategy::parse(""), ExposureStrategy::MultiHost);
        assert_eq!(ExposureStrategy::parse("default-host"), ExposureStrategy::MultiHost);
        assert_eq!(ExposureStrategy::parse("Single-Host"), ExposureStrategy::MultiHost);
    }

    #[test]
    fn test_unset_strategy_uses_default_server_strategy() {
        assert_eq!(
            ExposureStrategy::parse(DEFAULT_SERVER_EXPOSURE_STRATEGY),
            ExposureStrategy::MultiHost
        );
        for caps in [PlatformCapabilities::kubernetes(), PlatformCapabilities::openshift(4)] {
            let config = ExposureConfig::from_cluster(&cluster(None, None, None), &caps);
            assert_eq!(config.strategy, ExposureStrategy::MultiHost);
        }
        // Blank values count as unset
        let config = ExposureConfig::from_cluster(
            &cluster(Some("  "), Some(""), None),
            &PlatformCapabilities::kubernetes(),
        );
        assert_eq!(config.strategy, ExposureStrategy::MultiHost);
    }

    #[test]
    fn test_resolve_mode_table() {
        let cases = [
            (ExposureStrategy::MultiHost, false, false, ExposureMode::MultiHost),
            (ExposureStrategy::MultiHost, true, true, ExposureMode::MultiHost),
            (ExposureStrategy::SingleHost, false, false, ExposureMode::SingleHostDirect),
            (ExposureStrategy::SingleHost, true, false, ExposureMode::SingleHostGateway),
            (ExposureStrategy::SingleHost, false, true, ExposureMode::SingleHostGateway),
            (ExposureStrategy::SingleHost, true, true, ExposureMode::SingleHostGateway),
        ];

        for (strategy, gateway, capable, expected) in cases {
            let config = ExposureConfig {
                strategy,
                single_host_gateway_enabled: gateway,
                platform_capable: capable,
            };
            assert_eq!(resolve_mode(&config), expected, "config: {config:?}");
            // Pure: a second call yields the same answer
            assert_eq!(resolve_mode(&config), resolve_mode(&config));
        }
    }

    #[test]
    fn test_kubernetes_falls_back_to_ingress_strategy() {
        let caps = PlatformCapabilities::kubernetes();
        let config = ExposureConfig::from_cluster(&cluster(None, Some("single-host"), None), &caps);
        assert_eq!(config.strategy, ExposureStrategy::SingleHost);
        assert!(!config.single_host_gateway_enabled);
        assert_eq!(resolve_mode(&config), ExposureMode::SingleHostDirect);
    }

    #[test]
    fn test_kubernetes_server_strategy_wins() {
        let caps = PlatformCapabilities::kubernetes();
        let config = ExposureConfig::from_cluster(
            &cluster(Some("multi-host"), Some("single-host"), None),
            &caps,
        );
        assert_eq!(config.strategy, ExposureStrategy::MultiHost);
    }

    #[test]
    fn test_kubernetes_gateway_exposure_type() {
        let caps = PlatformCapabilities::kubernetes();
        let config = ExposureConfig::from_cluster(
            &cluster(Some("single-host"), None, Some("gateway")),
            &caps,
        );
        assert_eq!(resolve_mode(&config), ExposureMode::SingleHostGateway);
    }

    #[test]
    fn test_openshift_ignores_ingress_strategy() {
        let caps = PlatformCapabilities::openshift(4);
        let config = ExposureConfig::from_cluster(&cluster(None, Some("single-host"), None), &caps);
        assert_eq!(config.strategy, ExposureStrategy::MultiHost);
        assert!(config.platform_capable);
    }

    #[test]
    fn test_openshift_single_host_always_uses_gateway() {
        let caps = PlatformCapabilities::openshift(4);
        let config = ExposureConfig::from_cluster(
            &cluster(Some("single-host"), None, Some("native")),
            &caps,
        );
        assert_eq!(resolve_mode(&config), ExposureMode::SingleHostGateway);
    }
}
