//! # Endpoint Custom Settings
//!
//! User overrides merged into the Route/Ingress objects generated for an endpoint.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EndpointCustomSettings {
    /// Overrides applied when the endpoint is exposed through an OpenShift Route
    #[serde(default)]
    pub route: RouteCustomSettings,
    /// Overrides applied when the endpoint is exposed through an Ingress
    #[serde(default)]
    pub ingress: IngressCustomSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteCustomSettings {
    /// Extra labels, merged over the generated ones
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Extra annotations
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    /// Request `<endpoint>-<namespace>.<domain>` as the route host instead of
    /// letting OpenShift assign one
    #[serde(default)]
    pub domain: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngressCustomSettings {
    /// Extra labels, merged over the generated ones
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Extra annotations, overriding the generated ones on conflict
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    /// TLS secret for this endpoint; falls back to `k8s.tlsSecretName`
    #[serde(default)]
    pub tls_secret_name: Option<String>,
}
