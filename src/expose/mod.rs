//! # Endpoint Exposure
//!
//! Decides how each Che endpoint is reached from outside the cluster and
//! converges the cluster objects that make it so.
//!
//! - [`platform`] - one-time OpenShift/Kubernetes detection
//! - [`strategy`] - exposure mode resolution
//! - [`address`] - endpoint hostname and path computation
//! - [`reconciler`] - sync of the active mechanism and cleanup of the inactive one

pub mod address;
pub mod context;
pub mod error;
pub mod outcome;
pub mod platform;
pub mod reconciler;
pub mod strategy;

pub use address::{compute_address, EndpointAddress, EndpointRequest};
pub use context::ExposureContext;
pub use error::ExposeError;
pub use outcome::SyncOutcome;
pub use platform::{ApiGroupSource, PlatformCapabilities, PlatformProbeSettings};
pub use reconciler::{ExposureSettings, Exposer};
pub use strategy::{resolve_mode, ExposureConfig, ExposureMode, ExposureStrategy};
