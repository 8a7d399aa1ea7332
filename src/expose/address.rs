//! # Endpoint Addresses
//!
//! Endpoint requests and the deterministic computation of their external
//! hostname and path.

use crate::constants::{DEFAULT_TARGET_PORT, IDENTITY_PATH_PREFIX};
use crate::crd::{EndpointCustomSettings, IngressCustomSettings, RouteCustomSettings};
use crate::expose::{ExposeError, ExposureMode};
use regex::Regex;
use std::sync::LazyLock;

static DNS_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("DNS label regex is valid")
});

/// Maximum length of a DNS-1123 label
const MAX_LABEL_LENGTH: usize = 63;

/// One endpoint to expose
///
/// Built fresh on every reconciliation call from the CheCluster; never
/// persisted except through the cluster objects it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRequest {
    name: String,
    component: String,
    target_port: u16,
    is_identity_endpoint: bool,
    route_settings: RouteCustomSettings,
    ingress_settings: IngressCustomSettings,
}

impl EndpointRequest {
    /// Create a request for the endpoint (and service) called `name`
    ///
    /// # Errors
    ///
    /// `name` suffixes every generated object name, so it must be a DNS-1123 label.
    pub fn new(name: impl Into<String>) -> Result<Self, ExposeError> {
        let name = name.into();
        if name.len() > MAX_LABEL_LENGTH || !DNS_LABEL.is_match(&name) {
            return Err(ExposeError::InvalidEndpointName(name));
        }
        Ok(Self {
            component: name.clone(),
            name,
            target_port: DEFAULT_TARGET_PORT,
            is_identity_endpoint: false,
            route_settings: RouteCustomSettings::default(),
            ingress_settings: IngressCustomSettings::default(),
        })
    }

    /// Mark this endpoint as the identity provider (fixed `auth` prefix)
    #[must_use]
    pub fn identity(mut self) -> Self {
        self.is_identity_endpoint = true;
        self
    }

    #[must_use]
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = component.into();
        self
    }

    #[must_use]
    pub fn with_target_port(mut self, port: u16) -> Self {
        self.target_port = port;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: EndpointCustomSettings) -> Self {
        self.route_settings = settings.route;
        self.ingress_settings = settings.ingress;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn component(&self) -> &str {
        &self.component
    }

    #[must_use]
    pub fn target_port(&self) -> u16 {
        self.target_port
    }

    #[must_use]
    pub fn is_identity_endpoint(&self) -> bool {
        self.is_identity_endpoint
    }

    #[must_use]
    pub fn route_settings(&self) -> &RouteCustomSettings {
        &self.route_settings
    }

    #[must_use]
    pub fn ingress_settings(&self) -> &IngressCustomSettings {
        &self.ingress_settings
    }
}

/// Requested external location of an endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointAddress {
    /// Hostname the Route/Ingress is requested for
    pub domain: String,
    /// Address reported to users (`domain` or `domain/prefix`)
    pub address: String,
    /// Path prefix without leading slash
    pub path_prefix: String,
    /// Whether the prefix is stripped before the request reaches the service
    pub strip_prefix: bool,
}

/// Compute the requested address of an endpoint
///
/// In multi-host mode on OpenShift this is only the requested value; the route
/// host OpenShift assigns after creation is authoritative.
#[must_use]
pub fn compute_address(
    endpoint: &EndpointRequest,
    mode: ExposureMode,
    base_host: &str,
    namespace: &str,
    ingress_domain: &str,
) -> EndpointAddress {
    let (path_prefix, strip_prefix) = if endpoint.is_identity_endpoint {
        (IDENTITY_PATH_PREFIX.to_string(), false)
    } else {
        (endpoint.name.clone(), true)
    };

    let (domain, address) = match mode {
        ExposureMode::MultiHost => {
            let domain = format!("{}-{}.{}", endpoint.name, namespace, ingress_domain);
            (domain.clone(), domain)
        }
        ExposureMode::SingleHostGateway | ExposureMode::SingleHostDirect => {
            let domain = base_host.to_string();
            // The identity provider keeps its legacy address without the path
            let address = if endpoint.is_identity_endpoint {
                domain.clone()
            } else {
                format!("{domain}/{path_prefix}")
            };
            (domain, address)
        }
    };

    EndpointAddress {
        domain,
        address,
        path_prefix,
        strip_prefix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODES: [ExposureMode; 3] = [
        ExposureMode::MultiHost,
        ExposureMode::SingleHostGateway,
        ExposureMode::SingleHostDirect,
    ];

    #[test]
    fn test_identity_endpoint_path_policy_in_every_mode() {
        let endpoint = EndpointRequest::new("keycloak").unwrap().identity();
        for mode in MODES {
            let address = compute_address(&endpoint, mode, "che.example.com", "ns1", "example.com");
            assert_eq!(address.path_prefix, "auth");
            assert!(!address.strip_prefix);
        }
    }

    #[test]
    fn test_regular_endpoint_path_policy_in_every_mode() {
        let endpoint = EndpointRequest::new("plugin-registry").unwrap();
        for mode in MODES {
            let address = compute_address(&endpoint, mode, "che.example.com", "ns1", "example.com");
            assert_eq!(address.path_prefix, "plugin-registry");
            assert!(address.strip_prefix);
        }
    }

    #[test]
    fn test_multi_host_address() {
        let endpoint = EndpointRequest::new("dashboard").unwrap();
        let address = compute_address(
            &endpoint,
            ExposureMode::MultiHost,
            "che.example.com",
            "ns1",
            "example.com",
        );
        assert_eq!(address.domain, "dashboard-ns1.example.com");
        assert_eq!(address.address, "dashboard-ns1.example.com");
    }

    #[test]
    fn test_single_host_address_has_path_segment() {
        let endpoint = EndpointRequest::new("dashboard").unwrap();
        let address = compute_address(
            &endpoint,
            ExposureMode::SingleHostDirect,
            "che.example.com",
            "ns1",
            "example.com",
        );
        assert_eq!(address.domain, "che.example.com");
        assert_eq!(address.address, "che.example.com/dashboard");
    }

    #[test]
    fn test_single_host_identity_address_has_no_path_segment() {
        let endpoint = EndpointRequest::new("keycloak").unwrap().identity();
        let address = compute_address(
            &endpoint,
            ExposureMode::SingleHostGateway,
            "che.example.com",
            "ns1",
            "example.com",
        );
        assert_eq!(address.address, "che.example.com");
    }

    #[test]
    fn test_endpoint_name_validation() {
        assert!(EndpointRequest::new("devfile-registry").is_ok());
        assert!(EndpointRequest::new("che").is_ok());
        for bad in ["", "Che", "-che", "che-", "che_server", "che.server", &"a".repeat(64)] {
            assert!(
                matches!(EndpointRequest::new(bad), Err(ExposeError::InvalidEndpointName(_))),
                "'{bad}' should be rejected"
            );
        }
    }

    #[test]
    fn test_builder_defaults() {
        let endpoint = EndpointRequest::new("che").unwrap();
        assert_eq!(endpoint.component(), "che");
        assert_eq!(endpoint.target_port(), 8080);
        assert!(!endpoint.is_identity_endpoint());

        let endpoint = endpoint.with_component("che-server").with_target_port(9090);
        assert_eq!(endpoint.component(), "che-server");
        assert_eq!(endpoint.target_port(), 9090);
    }
}
