//! Che Exposure Controller Library
//!
//! Resolves how Eclipse Che endpoints are exposed (OpenShift Route, Kubernetes
//! Ingress or a path on the shared gateway) and converges the cluster objects
//! that implement the chosen mechanism.
//!
//! ## Quick Start
//!
//! ```rust
//! use che_exposure_controller::prelude::*;
//! ```
//!
//! This brings commonly used types and traits into scope. For more specific imports,
//! use the individual modules.

// Re-export modules so they can be tested
pub mod config;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod expose;
pub mod observability;
pub mod prelude;
pub mod runtime;
pub mod sync;
