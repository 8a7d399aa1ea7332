//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ## Usage
//!
//! ```rust
//! use che_exposure_controller::prelude::*;
//! ```
//!
//! This brings into scope:
//! - CRD types (CheCluster, Route, endpoint settings)
//! - The exposure core (Exposer, ExposureContext, SyncOutcome, ...)
//! - The object sync contract and its kube implementation
//! - Config types (ControllerConfig)

// CRD types - most commonly used
pub use crate::crd::*;

// Exposure core
pub use crate::expose::{
    compute_address, resolve_mode, EndpointAddress, EndpointRequest, ExposeError, ExposureConfig,
    ExposureContext, ExposureMode, ExposureSettings, ExposureStrategy, Exposer,
    PlatformCapabilities, PlatformProbeSettings, SyncOutcome,
};

// Object sync contract
pub use crate::sync::{
    GatewayRoute, IngressObject, KubeObjectSync, ObjectKind, ObjectSync, RouteObject,
};

// Config types - for configuration management
pub use crate::config::ControllerConfig;
