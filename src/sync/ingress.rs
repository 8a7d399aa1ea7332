//! # Ingress Objects
//!
//! Desired Kubernetes Ingress for an endpoint exposed directly (multi-host, or
//! single-host without the gateway) on a plain Kubernetes cluster.

use crate::crd::IngressCustomSettings;
use crate::sync::object_labels;
use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
    IngressServiceBackend, IngressSpec, IngressTLS, ServiceBackendPort,
};
use kube::api::ObjectMeta;
use std::collections::BTreeMap;

const INGRESS_CLASS_ANNOTATION: &str = "kubernetes.io/ingress.class";
const PROXY_READ_TIMEOUT_ANNOTATION: &str = "nginx.ingress.kubernetes.io/proxy-read-timeout";
const PROXY_CONNECT_TIMEOUT_ANNOTATION: &str = "nginx.ingress.kubernetes.io/proxy-connect-timeout";
const SSL_REDIRECT_ANNOTATION: &str = "nginx.ingress.kubernetes.io/ssl-redirect";
const PROXY_BUFFER_SIZE_ANNOTATION: &str = "nginx.ingress.kubernetes.io/proxy-buffer-size";
const REWRITE_TARGET_ANNOTATION: &str = "nginx.ingress.kubernetes.io/rewrite-target";

/// Long-lived connections (workspace websockets) must not time out
const PROXY_TIMEOUT_SECONDS: &str = "3600";

/// The identity provider sends large headers
const IDENTITY_PROXY_BUFFER_SIZE: &str = "16k";

/// Desired Ingress for one endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngressObject {
    /// Ingress name, equal to the endpoint (and service) name
    pub name: String,
    pub host: String,
    /// Path prefix without leading slash
    pub path_prefix: String,
    pub strip_prefix: bool,
    /// Single-host ingresses are routed by path, multi-host ones by host only
    pub single_host: bool,
    pub is_identity_endpoint: bool,
    pub service_port: u16,
    pub component: String,
    pub app_name: String,
    pub ingress_class: String,
    pub tls_enabled: bool,
    /// Cluster-wide TLS secret, used unless the endpoint settings name one
    pub tls_secret_name: Option<String>,
    pub custom: IngressCustomSettings,
}

impl IngressObject {
    /// HTTP path and path type of the single rule
    #[must_use]
    pub fn path(&self) -> (String, &'static str) {
        if !self.single_host {
            ("/".to_string(), "Prefix")
        } else if self.strip_prefix {
            (format!("/{}(/|$)(.*)", self.path_prefix), "ImplementationSpecific")
        } else {
            (format!("/{}", self.path_prefix), "Prefix")
        }
    }

    #[must_use]
    pub fn labels(&self) -> BTreeMap<String, String> {
        let mut labels = object_labels(&self.app_name, &self.component);
        labels.extend(self.custom.labels.clone());
        labels
    }

    /// Generated annotations, overridden by the custom ones on conflict
    #[must_use]
    pub fn annotations(&self) -> BTreeMap<String, String> {
        let mut annotations = BTreeMap::from([
            (INGRESS_CLASS_ANNOTATION.to_string(), self.ingress_class.clone()),
            (
                PROXY_READ_TIMEOUT_ANNOTATION.to_string(),
                PROXY_TIMEOUT_SECONDS.to_string(),
            ),
            (
                PROXY_CONNECT_TIMEOUT_ANNOTATION.to_string(),
                PROXY_TIMEOUT_SECONDS.to_string(),
            ),
            (SSL_REDIRECT_ANNOTATION.to_string(), self.tls_enabled.to_string()),
        ]);
        if self.is_identity_endpoint {
            annotations.insert(
                PROXY_BUFFER_SIZE_ANNOTATION.to_string(),
                IDENTITY_PROXY_BUFFER_SIZE.to_string(),
            );
        }
        if self.single_host && self.strip_prefix {
            annotations.insert(REWRITE_TARGET_ANNOTATION.to_string(), "/$2".to_string());
        }
        annotations.extend(self.custom.annotations.clone());
        annotations
    }

    /// TLS secret of this endpoint
    #[must_use]
    pub fn effective_tls_secret(&self) -> Option<&str> {
        self.custom
            .tls_secret_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.tls_secret_name.as_deref())
    }

    #[must_use]
    pub fn spec(&self) -> IngressSpec {
        let (path, path_type) = self.path();
        let tls = self.tls_enabled.then(|| {
            vec![IngressTLS {
                hosts: Some(vec![self.host.clone()]),
                secret_name: self.effective_tls_secret().map(String::from),
            }]
        });

        IngressSpec {
            rules: Some(vec![IngressRule {
                host: Some(self.host.clone()),
                http: Some(HTTPIngressRuleValue {
                    paths: vec![HTTPIngressPath {
                        backend: IngressBackend {
                            service: Some(IngressServiceBackend {
                                name: self.name.clone(),
                                port: Some(ServiceBackendPort {
                                    number: Some(i32::from(self.service_port)),
                                    ..Default::default()
                                }),
                            }),
                            ..Default::default()
                        },
                        path: Some(path),
                        path_type: path_type.to_string(),
                    }],
                }),
            }]),
            tls,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn to_ingress(&self, namespace: &str) -> Ingress {
        Ingress {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(namespace.to_string()),
                labels: Some(self.labels()),
                annotations: Some(self.annotations()),
                ..Default::default()
            },
            spec: Some(self.spec()),
            ..Default::default()
        }
    }
}

/// Whether a live Ingress differs from the desired one
#[must_use]
pub fn ingress_drifted(desired: &Ingress, live: &Ingress) -> bool {
    desired.spec != live.spec
        || !metadata_matches(desired.metadata.labels.as_ref(), live.metadata.labels.as_ref())
        || !metadata_matches(
            desired.metadata.annotations.as_ref(),
            live.metadata.annotations.as_ref(),
        )
}

fn metadata_matches(
    desired: Option<&BTreeMap<String, String>>,
    live: Option<&BTreeMap<String, String>>,
) -> bool {
    desired.is_none_or(|desired| super::is_subset(desired, live))
}
