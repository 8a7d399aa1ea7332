//! # Exposure Errors
//!
//! Errors raised while resolving or converging an endpoint's exposure.
//!
//! Only `Probe` and `Sync`/`RouteLookup` ever reach the caller. `Cleanup` is
//! built for logging and then dropped.

use crate::sync::ObjectKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExposeError {
    /// Platform capability detection failed; nothing was cached
    #[error("Platform capability probe failed: {0}")]
    Probe(#[source] anyhow::Error),

    /// A single sync attempt failed; the caller retries on its next pass
    #[error("Failed to sync {kind} '{name}': {source}")]
    Sync {
        kind: ObjectKind,
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// Removing an object of an inactive exposure mechanism failed
    #[error("Failed to delete stale {kind} '{name}': {source}")]
    Cleanup {
        kind: ObjectKind,
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// Reading back the host OpenShift assigned to a route failed
    #[error("Failed to read host of route '{name}': {source}")]
    RouteLookup {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid endpoint name '{0}': must be a lowercase RFC 1123 label of at most 63 characters")]
    InvalidEndpointName(String),
}

impl ExposeError {
    /// Build a sync error for an object
    pub fn sync(kind: ObjectKind, name: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Sync {
            kind,
            name: name.into(),
            source,
        }
    }
}
