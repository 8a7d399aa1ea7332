//! # Custom Resource Definitions
//!
//! Resource types read and written by the exposure controller.
//!
//! ## Module Structure
//!
//! - `spec.rs` - `CheCluster` specification (the fields exposure depends on)
//! - `settings.rs` - Per-endpoint Route/Ingress custom settings
//! - `status.rs` - `CheCluster` status written after each pass
//! - `route.rs` - OpenShift `route.openshift.io/v1` Route

mod route;
mod settings;
mod spec;
mod status;

pub use route::{
    Route, RouteIngress, RoutePort, RouteSpec, RouteStatus, RouteTargetReference, TlsConfig,
};
pub use settings::{EndpointCustomSettings, IngressCustomSettings, RouteCustomSettings};
pub use spec::{CheCluster, CheClusterK8sSpec, CheClusterServerSpec, CheClusterSpec};
pub use status::{CheClusterStatus, Condition};
