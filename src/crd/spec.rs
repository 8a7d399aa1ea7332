//! # CheCluster Spec
//!
//! The subset of the `CheCluster` specification that decides how Che endpoints
//! are exposed.

use crate::crd::EndpointCustomSettings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// CheCluster Custom Resource Definition
///
/// Only the fields consumed by the exposure controller are modelled; unknown
/// fields of a full CheCluster are ignored on deserialization.
///
/// # Example
///
/// ```yaml
/// apiVersion: org.eclipse.che/v1
/// kind: CheCluster
/// metadata:
///   name: eclipse-che
///   namespace: eclipse-che
/// spec:
///   server:
///     serverExposureStrategy: single-host
///     cheHost: che.example.com
///     tlsSupport: true
///   k8s:
///     ingressDomain: example.com
///     singleHostExposureType: gateway
/// ```
#[derive(kube::CustomResource, Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[kube(
    kind = "CheCluster",
    group = "org.eclipse.che",
    version = "v1",
    namespaced,
    status = "crate::crd::CheClusterStatus",
    printcolumn = r#"{"name":"Exposure", "type":"string", "jsonPath":".status.exposureMode"}, {"name":"Ready", "type":"string", "jsonPath":".status.conditions[?(@.type==\"Exposed\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct CheClusterSpec {
    /// Che server settings
    #[serde(default)]
    pub server: CheClusterServerSpec,
    /// Settings that only apply to plain Kubernetes (ingress-only) clusters
    #[serde(default)]
    pub k8s: CheClusterK8sSpec,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheClusterServerSpec {
    /// Public hostname shared by all endpoints in single-host mode
    /// Falls back to `k8s.ingressDomain` when empty
    #[serde(default)]
    pub che_host: Option<String>,
    /// Product flavor, used as the `app` label of generated objects (default "che")
    #[serde(default)]
    pub che_flavor: Option<String>,
    /// Exposure strategy: "multi-host" or "single-host"
    /// On Kubernetes an empty value falls back to `k8s.ingressStrategy`
    #[serde(default)]
    pub server_exposure_strategy: Option<String>,
    /// Serve endpoints over TLS
    #[serde(default)]
    pub tls_support: bool,
    /// Custom labels/annotations per exposed endpoint, keyed by endpoint name
    #[serde(default)]
    pub endpoint_settings: BTreeMap<String, EndpointCustomSettings>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheClusterK8sSpec {
    /// Domain under which multi-host endpoint hostnames are generated
    #[serde(default)]
    pub ingress_domain: Option<String>,
    /// Legacy location of the exposure strategy
    #[serde(default)]
    pub ingress_strategy: Option<String>,
    /// Ingress class annotation value (default "nginx")
    #[serde(default)]
    pub ingress_class: Option<String>,
    /// TLS secret used by ingresses when TLS is enabled
    #[serde(default)]
    pub tls_secret_name: Option<String>,
    /// Single-host exposure type: "native" (one ingress per endpoint) or "gateway"
    #[serde(default)]
    pub single_host_exposure_type: Option<String>,
}

impl CheCluster {
    /// Custom settings for one endpoint, or the empty default
    #[must_use]
    pub fn endpoint_settings(&self, endpoint: &str) -> EndpointCustomSettings {
        self.spec
            .server
            .endpoint_settings
            .get(endpoint)
            .cloned()
            .unwrap_or_default()
    }
}
