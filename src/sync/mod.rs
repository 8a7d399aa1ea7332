//! # Declarative Object Sync
//!
//! The contract between the exposure reconciler and the cluster: "make this
//! object look like this", answered with a tri-state [`SyncOutcome`].
//!
//! - [`gateway`] - gateway route ConfigMaps (Traefik dynamic configuration)
//! - [`ingress`] - Kubernetes Ingress objects
//! - [`route`] - OpenShift Route objects
//! - [`cluster`] - `kube::Api` backed implementation

pub mod cluster;
pub mod gateway;
pub mod ingress;
pub mod route;

pub use cluster::KubeObjectSync;
pub use gateway::GatewayRoute;
pub use ingress::IngressObject;
pub use route::RouteObject;

use crate::constants::FIELD_MANAGER;
use crate::expose::SyncOutcome;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Kind of object an exposure mechanism is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// ConfigMap holding one gateway route entry
    GatewayRoute,
    Ingress,
    Route,
}

impl ObjectKind {
    /// Label value used in metrics
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GatewayRoute => "gateway-route",
            Self::Ingress => "ingress",
            Self::Route => "route",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GatewayRoute => write!(f, "gateway route ConfigMap"),
            Self::Ingress => write!(f, "Ingress"),
            Self::Route => write!(f, "Route"),
        }
    }
}

/// Converges desired objects in one namespace
///
/// Every sync is idempotent: calling it again with the same desired object
/// eventually yields `Ready` and causes no further writes.
#[async_trait]
pub trait ObjectSync: Send + Sync {
    async fn sync_gateway_route(&self, desired: &GatewayRoute) -> SyncOutcome;

    async fn sync_ingress(&self, desired: &IngressObject) -> SyncOutcome;

    async fn sync_route(&self, desired: &RouteObject) -> SyncOutcome;

    /// Delete an object by kind and name
    ///
    /// Returns `Ok(false)` when the object does not exist.
    async fn delete_object(&self, kind: ObjectKind, name: &str) -> anyhow::Result<bool>;

    /// Host the platform assigned to a route, `None` if the route is missing
    /// or not admitted yet
    async fn route_host(&self, name: &str) -> anyhow::Result<Option<String>>;
}

/// Labels every generated object carries
#[must_use]
pub fn object_labels(app_name: &str, component: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("app".to_string(), app_name.to_string()),
        ("component".to_string(), component.to_string()),
        (
            "app.kubernetes.io/managed-by".to_string(),
            FIELD_MANAGER.to_string(),
        ),
    ])
}

/// Whether every entry of `desired` is present with the same value in `live`
///
/// Extra entries on the live object (added by users or other controllers) are
/// not drift.
#[must_use]
pub fn is_subset(desired: &BTreeMap<String, String>, live: Option<&BTreeMap<String, String>>) -> bool {
    desired.is_empty()
        || live.is_some_and(|live| desired.iter().all(|(k, v)| live.get(k) == Some(v)))
}
