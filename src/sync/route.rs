//! # Route Objects
//!
//! Desired OpenShift Route for an endpoint exposed directly on OpenShift.

use crate::crd::{Route, RoutePort, RouteSpec, RouteTargetReference, TlsConfig};
use crate::sync::object_labels;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::api::ObjectMeta;
use std::collections::BTreeMap;

/// Desired Route for one endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteObject {
    /// Route name, equal to the endpoint (and service) name
    pub name: String,
    pub service_port: u16,
    /// Requested host; `None` lets OpenShift assign one
    pub host: Option<String>,
    pub path: Option<String>,
    pub tls_enabled: bool,
    pub component: String,
    pub app_name: String,
    pub custom_labels: BTreeMap<String, String>,
    pub custom_annotations: BTreeMap<String, String>,
}

impl RouteObject {
    #[must_use]
    pub fn labels(&self) -> BTreeMap<String, String> {
        let mut labels = object_labels(&self.app_name, &self.component);
        labels.extend(self.custom_labels.clone());
        labels
    }

    #[must_use]
    pub fn spec(&self) -> RouteSpec {
        RouteSpec {
            host: self.host.clone(),
            path: self.path.clone(),
            to: RouteTargetReference {
                kind: "Service".to_string(),
                name: self.name.clone(),
                weight: Some(100),
            },
            port: Some(RoutePort {
                target_port: IntOrString::Int(i32::from(self.service_port)),
            }),
            tls: self.tls_enabled.then(|| TlsConfig {
                termination: "edge".to_string(),
                insecure_edge_termination_policy: Some("Redirect".to_string()),
            }),
        }
    }

    #[must_use]
    pub fn to_route(&self, namespace: &str) -> Route {
        let mut route = Route::new(&self.name, self.spec());
        route.metadata = ObjectMeta {
            name: Some(self.name.clone()),
            namespace: Some(namespace.to_string()),
            labels: Some(self.labels()),
            annotations: (!self.custom_annotations.is_empty())
                .then(|| self.custom_annotations.clone()),
            ..Default::default()
        };
        route
    }
}

/// Whether a live Route differs from the desired one
///
/// The host is only compared when one was requested: an empty desired host
/// means "let the platform assign it", and the assigned value is not drift.
#[must_use]
pub fn route_drifted(desired: &Route, live: &Route) -> bool {
    let (want, have) = (&desired.spec, &live.spec);
    let host_drifted = want.host.is_some() && want.host != have.host;

    host_drifted
        || want.to != have.to
        || want.port != have.port
        || want.path != have.path
        || want.tls != have.tls
        || !desired
            .metadata
            .labels
            .as_ref()
            .is_none_or(|labels| super::is_subset(labels, live.metadata.labels.as_ref()))
        || !desired
            .metadata
            .annotations
            .as_ref()
            .is_none_or(|annotations| {
                super::is_subset(annotations, live.metadata.annotations.as_ref())
            })
}

/// Carry the platform-assigned host over to a replacement
///
/// Without this a replace of a route with no requested host would make
/// OpenShift generate a fresh one.
pub fn preserve_assigned_host(desired: &mut Route, live: &Route) {
    if desired.spec.host.is_none() {
        desired.spec.host.clone_from(&live.spec.host);
    }
}

/// First admitted host of a live route, if any
#[must_use]
pub fn assigned_host(route: &Route) -> Option<String> {
    route
        .status
        .as_ref()
        .and_then(|status| status.ingress.iter().find_map(|ingress| ingress.host.clone()))
        .or_else(|| route.spec.host.clone())
        .filter(|host| !host.is_empty())
}
