//! # Gateway Route Entries
//!
//! One gateway route entry is a ConfigMap holding a Traefik dynamic
//! configuration file. The gateway watches ConfigMaps labelled
//! `component=che-gateway-config` and merges them into its routing table.

use crate::constants::{GATEWAY_CONFIG_COMPONENT, GATEWAY_ROUTE_PRIORITY};
use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::ObjectMeta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Desired gateway route entry for one endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRoute {
    /// ConfigMap name, also used as router, service and middleware name
    pub name: String,
    /// Path prefix including the leading slash
    pub path_prefix: String,
    /// Backend URL, e.g. `http://plugin-registry:8080`
    pub service_url: String,
    pub strip_prefix: bool,
    pub priority: i32,
    /// `app` label value
    pub app_name: String,
}

impl GatewayRoute {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        path_prefix: &str,
        service_url: impl Into<String>,
        strip_prefix: bool,
        app_name: impl Into<String>,
    ) -> Self {
        let path_prefix = if path_prefix.starts_with('/') {
            path_prefix.to_string()
        } else {
            format!("/{path_prefix}")
        };
        Self {
            name: name.into(),
            path_prefix,
            service_url: service_url.into(),
            strip_prefix,
            priority: GATEWAY_ROUTE_PRIORITY,
            app_name: app_name.into(),
        }
    }

    /// Data key of the configuration file inside the ConfigMap
    #[must_use]
    pub fn data_key(&self) -> String {
        format!("{}.yml", self.name)
    }

    #[must_use]
    pub fn labels(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("app".to_string(), self.app_name.clone()),
            ("component".to_string(), GATEWAY_CONFIG_COMPONENT.to_string()),
        ])
    }

    /// Traefik dynamic configuration of this entry
    #[must_use]
    pub fn traefik_config(&self) -> TraefikConfig {
        let mut middlewares = BTreeMap::new();
        let mut router_middlewares = Vec::new();
        if self.strip_prefix && self.path_prefix != "/" {
            middlewares.insert(
                self.name.clone(),
                TraefikMiddleware {
                    strip_prefix: TraefikStripPrefix {
                        prefixes: vec![self.path_prefix.clone()],
                    },
                },
            );
            router_middlewares.push(self.name.clone());
        }

        TraefikConfig {
            http: TraefikHttp {
                routers: BTreeMap::from([(
                    self.name.clone(),
                    TraefikRouter {
                        rule: format!("PathPrefix(`{}`)", self.path_prefix),
                        service: self.name.clone(),
                        middlewares: router_middlewares,
                        priority: self.priority,
                    },
                )]),
                services: BTreeMap::from([(
                    self.name.clone(),
                    TraefikService {
                        load_balancer: TraefikLoadBalancer {
                            servers: vec![TraefikServer {
                                url: self.service_url.clone(),
                            }],
                        },
                    },
                )]),
                middlewares,
            },
        }
    }

    /// Render the ConfigMap
    ///
    /// # Errors
    ///
    /// Fails if the Traefik configuration cannot be serialized.
    pub fn to_config_map(&self, namespace: &str) -> Result<ConfigMap> {
        let content = serde_yaml::to_string(&self.traefik_config()).with_context(|| {
            format!("Failed to serialize gateway configuration '{}'", self.name)
        })?;

        Ok(ConfigMap {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(namespace.to_string()),
                labels: Some(self.labels()),
                ..Default::default()
            },
            data: Some(BTreeMap::from([(self.data_key(), content)])),
            ..Default::default()
        })
    }
}

/// Whether a live gateway ConfigMap differs from the desired one
///
/// The data must match exactly; desired labels must be present.
#[must_use]
pub fn config_map_drifted(desired: &ConfigMap, live: &ConfigMap) -> bool {
    desired.data != live.data
        || desired
            .metadata
            .labels
            .as_ref()
            .is_some_and(|labels| !super::is_subset(labels, live.metadata.labels.as_ref()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraefikConfig {
    pub http: TraefikHttp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraefikHttp {
    pub routers: BTreeMap<String, TraefikRouter>,
    pub services: BTreeMap<String, TraefikService>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub middlewares: BTreeMap<String, TraefikMiddleware>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraefikRouter {
    pub rule: String,
    pub service: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub middlewares: Vec<String>,
    pub priority: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraefikService {
    #[serde(rename = "loadBalancer")]
    pub load_balancer: TraefikLoadBalancer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraefikLoadBalancer {
    pub servers: Vec<TraefikServer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraefikServer {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraefikMiddleware {
    #[serde(rename = "stripPrefix")]
    pub strip_prefix: TraefikStripPrefix,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraefikStripPrefix {
    pub prefixes: Vec<String>,
}
