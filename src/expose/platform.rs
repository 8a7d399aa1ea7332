//! # Platform Capabilities
//!
//! Detects whether the controller runs on OpenShift (route-capable) or on plain
//! Kubernetes (ingress-only).
//!
//! Detection runs once at startup and yields an immutable [`PlatformCapabilities`]
//! value that is passed to every consumer. It is never re-probed, so migrating a
//! cluster between platforms requires restarting the controller.

use crate::constants::{OPENSHIFT_CONFIG_API_GROUP, OPENSHIFT_ROUTE_API_GROUP};
use crate::expose::ExposeError;
use anyhow::Context;
use async_trait::async_trait;
use tracing::{debug, info};

/// Source of the API group names served by the cluster
#[async_trait]
pub trait ApiGroupSource: Send + Sync {
    async fn api_groups(&self) -> anyhow::Result<Vec<String>>;
}

#[async_trait]
impl ApiGroupSource for kube::Client {
    async fn api_groups(&self) -> anyhow::Result<Vec<String>> {
        let list = self
            .list_api_groups()
            .await
            .context("Failed to list API groups")?;
        Ok(list.groups.into_iter().map(|group| group.name).collect())
    }
}

/// Inputs of the probe that come from the process environment
///
/// Read once at startup (`MOCK_API`, `OPENSHIFT_VERSION`), never per call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformProbeSettings {
    /// Offline mode: skip the probe and assume OpenShift
    pub test_mode: bool,
    /// Raw `OPENSHIFT_VERSION` override, only honoured in test mode
    pub openshift_version: Option<String>,
}

impl PlatformProbeSettings {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            test_mode: std::env::var("MOCK_API").is_ok_and(|v| !v.is_empty()),
            openshift_version: std::env::var("OPENSHIFT_VERSION").ok(),
        }
    }
}

/// What the target platform can do
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlatformCapabilities {
    is_openshift: bool,
    is_openshift4: bool,
}

impl PlatformCapabilities {
    /// Plain Kubernetes: ingress objects only
    #[must_use]
    pub const fn kubernetes() -> Self {
        Self {
            is_openshift: false,
            is_openshift4: false,
        }
    }

    /// OpenShift with the given major version (4 enables config.openshift.io features)
    #[must_use]
    pub const fn openshift(major: u32) -> Self {
        Self {
            is_openshift: true,
            is_openshift4: major >= 4,
        }
    }

    /// Capabilities used in test/offline mode
    ///
    /// Always OpenShift; version 4 only when the override parses to 4.
    #[must_use]
    pub fn for_test_mode(openshift_version: Option<&str>) -> Self {
        let is_v4 = openshift_version
            .and_then(|v| v.trim().parse::<i64>().ok())
            .is_some_and(|v| v == 4);
        Self {
            is_openshift: true,
            is_openshift4: is_v4,
        }
    }

    /// Derive capabilities from the API groups a cluster serves
    #[must_use]
    pub fn from_api_groups<S: AsRef<str>>(groups: &[S]) -> Self {
        let mut caps = Self::kubernetes();
        for group in groups {
            match group.as_ref() {
                OPENSHIFT_ROUTE_API_GROUP => caps.is_openshift = true,
                OPENSHIFT_CONFIG_API_GROUP => caps.is_openshift4 = true,
                _ => {}
            }
        }
        caps
    }

    /// Probe the cluster, or short-circuit in test mode
    ///
    /// # Errors
    ///
    /// Returns [`ExposeError::Probe`] when the API groups cannot be listed.
    pub async fn detect(
        source: &dyn ApiGroupSource,
        settings: &PlatformProbeSettings,
    ) -> Result<Self, ExposeError> {
        if settings.test_mode {
            let caps = Self::for_test_mode(settings.openshift_version.as_deref());
            debug!("Test mode: skipping platform probe, assuming {}", caps);
            return Ok(caps);
        }

        let groups = source.api_groups().await.map_err(ExposeError::Probe)?;
        let caps = Self::from_api_groups(&groups);
        info!("Detected platform: {} ({} API groups)", caps, groups.len());
        Ok(caps)
    }

    /// Route-capable platform (OpenShift)
    #[must_use]
    pub const fn is_openshift(&self) -> bool {
        self.is_openshift
    }

    #[must_use]
    pub const fn is_openshift4(&self) -> bool {
        self.is_openshift4
    }

    /// OpenShift major version, `None` on plain Kubernetes
    #[must_use]
    pub const fn openshift_major_version(&self) -> Option<u32> {
        if !self.is_openshift {
            None
        } else if self.is_openshift4 {
            Some(4)
        } else {
            Some(3)
        }
    }
}

impl std::fmt::Display for PlatformCapabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.openshift_major_version() {
            Some(major) => write!(f, "OpenShift {major}"),
            None => write!(f, "Kubernetes"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticGroups(anyhow::Result<Vec<String>>);

    #[async_trait]
    impl ApiGroupSource for StaticGroups {
        async fn api_groups(&self) -> anyhow::Result<Vec<String>> {
            match &self.0 {
                Ok(groups) => Ok(groups.clone()),
                Err(e) => Err(anyhow::anyhow!("{e}")),
            }
        }
    }

    #[test]
    fn test_route_group_means_openshift() {
        let caps = PlatformCapabilities::from_api_groups(&["apps", "route.openshift.io"]);
        assert!(caps.is_openshift());
        assert!(!caps.is_openshift4());
        assert_eq!(caps.openshift_major_version(), Some(3));
    }

    #[test]
    fn test_config_group_means_openshift4() {
        let caps = PlatformCapabilities::from_api_groups(&[
            "route.openshift.io",
            "config.openshift.io",
        ]);
        assert_eq!(caps.openshift_major_version(), Some(4));
        assert_eq!(caps.to_string(), "OpenShift 4");
    }

    #[test]
    fn test_plain_kubernetes() {
        let caps = PlatformCapabilities::from_api_groups(&["apps", "networking.k8s.io"]);
        assert!(!caps.is_openshift());
        assert_eq!(caps.openshift_major_version(), None);
    }

    #[test]
    fn test_test_mode_version_override() {
        assert!(PlatformCapabilities::for_test_mode(Some("4")).is_openshift4());
        assert!(!PlatformCapabilities::for_test_mode(Some("3")).is_openshift4());
        assert!(!PlatformCapabilities::for_test_mode(Some("four")).is_openshift4());
        let caps = PlatformCapabilities::for_test_mode(None);
        assert!(caps.is_openshift());
        assert!(!caps.is_openshift4());
    }

    #[tokio::test]
    async fn test_detect_skips_probe_in_test_mode() {
        let source = StaticGroups(Err(anyhow::anyhow!("must not be called")));
        let settings = PlatformProbeSettings {
            test_mode: true,
            openshift_version: Some("4".to_string()),
        };
        let caps = PlatformCapabilities::detect(&source, &settings).await.unwrap();
        assert_eq!(caps, PlatformCapabilities::openshift(4));
    }

    #[tokio::test]
    async fn test_detect_propagates_probe_error() {
        let source = StaticGroups(Err(anyhow::anyhow!("connection refused")));
        let result = PlatformCapabilities::detect(&source, &PlatformProbeSettings::default()).await;
        assert!(matches!(result, Err(ExposeError::Probe(_))));
    }

    #[tokio::test]
    async fn test_detect_uses_api_groups() {
        let source = StaticGroups(Ok(vec!["route.openshift.io".to_string()]));
        let caps = PlatformCapabilities::detect(&source, &PlatformProbeSettings::default())
            .await
            .unwrap();
        assert_eq!(caps, PlatformCapabilities::openshift(3));
    }
}
