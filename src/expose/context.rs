//! # Exposure Context
//!
//! Cluster-wide inputs of one reconciliation, read from the `CheCluster`.

use crate::constants::{DEFAULT_APP_NAME, DEFAULT_INGRESS_CLASS};
use crate::crd::CheCluster;
use crate::expose::{resolve_mode, ExposureConfig, ExposureMode, PlatformCapabilities};
use kube::ResourceExt;

/// Everything besides the endpoint itself that decides how it is exposed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposureContext {
    pub namespace: String,
    pub config: ExposureConfig,
    /// Shared hostname in single-host mode
    pub base_host: String,
    /// Domain of generated multi-host hostnames
    pub ingress_domain: String,
    pub ingress_class: String,
    pub tls_enabled: bool,
    /// Cluster-wide ingress TLS secret
    pub tls_secret_name: Option<String>,
    /// `app` label of generated objects
    pub app_name: String,
}

impl ExposureContext {
    /// Build the context of a CheCluster
    ///
    /// The namespace is the CheCluster's own; `default_namespace` is only used
    /// for objects that were never stored and therefore carry none.
    #[must_use]
    pub fn from_cluster(
        cluster: &CheCluster,
        capabilities: &PlatformCapabilities,
        default_namespace: &str,
    ) -> Self {
        let server = &cluster.spec.server;
        let k8s = &cluster.spec.k8s;
        let ingress_domain = non_empty(k8s.ingress_domain.as_deref()).unwrap_or_default();

        Self {
            namespace: cluster
                .namespace()
                .unwrap_or_else(|| default_namespace.to_string()),
            config: ExposureConfig::from_cluster(cluster, capabilities),
            base_host: non_empty(server.che_host.as_deref())
                .unwrap_or(ingress_domain)
                .to_string(),
            ingress_domain: ingress_domain.to_string(),
            ingress_class: non_empty(k8s.ingress_class.as_deref())
                .unwrap_or(DEFAULT_INGRESS_CLASS)
                .to_string(),
            tls_enabled: server.tls_support,
            tls_secret_name: non_empty(k8s.tls_secret_name.as_deref()).map(String::from),
            app_name: non_empty(server.che_flavor.as_deref())
                .unwrap_or(DEFAULT_APP_NAME)
                .to_string(),
        }
    }

    /// Active exposure mode for every endpoint of this context
    #[must_use]
    pub fn mode(&self) -> ExposureMode {
        resolve_mode(&self.config)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
