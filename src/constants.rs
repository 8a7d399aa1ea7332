//! # Constants
//!
//! Shared constants used throughout the controller.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Field manager / label value identifying objects written by this controller
pub const FIELD_MANAGER: &str = "che-operator";

/// Exposure strategy used when neither the server nor the k8s strategy is set
pub const DEFAULT_SERVER_EXPOSURE_STRATEGY: &str = "multi-host";

/// Single-host exposure type on Kubernetes when `singleHostExposureType` is unset
pub const DEFAULT_SINGLE_HOST_EXPOSURE_TYPE: &str = "native";

/// Single-host exposure type value that routes through the shared gateway
pub const GATEWAY_SINGLE_HOST_EXPOSURE_TYPE: &str = "gateway";

/// Ingress class used when the CheCluster does not set one
pub const DEFAULT_INGRESS_CLASS: &str = "nginx";

/// Application name (`app` label) used when the CheCluster does not set a flavor
pub const DEFAULT_APP_NAME: &str = "che";

/// Name of the identity provider endpoint, exposed under the fixed `auth` prefix
pub const DEFAULT_IDENTITY_ENDPOINT: &str = "keycloak";

/// Path prefix of the identity provider endpoint
pub const IDENTITY_PATH_PREFIX: &str = "auth";

/// Port every exposed endpoint's service listens on unless configured otherwise
pub const DEFAULT_TARGET_PORT: u16 = 8080;

/// Prefix of the gateway route ConfigMap names (`<prefix><endpoint>`)
pub const DEFAULT_GATEWAY_CONFIG_PREFIX: &str = "che-gateway-route-";

/// `component` label value the gateway uses to pick up route ConfigMaps
pub const GATEWAY_CONFIG_COMPONENT: &str = "che-gateway-config";

/// Priority of the Traefik routers generated for gateway route entries
pub const GATEWAY_ROUTE_PRIORITY: i32 = 10;

/// Default name of the CheCluster resource driving the exposure
pub const DEFAULT_CHE_CLUSTER_NAME: &str = "eclipse-che";

/// Default namespace when neither POD_NAMESPACE nor --namespace is given
pub const DEFAULT_NAMESPACE: &str = "eclipse-che";

/// Endpoints exposed by default
pub const DEFAULT_EXPOSED_ENDPOINTS: &str = "che,devfile-registry,plugin-registry,keycloak";

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 5000;

/// Interval between full passes once every endpoint is exposed (Kubernetes duration)
pub const DEFAULT_RESYNC_INTERVAL: &str = "5m";

/// Requeue interval while at least one endpoint is still converging (seconds)
pub const DEFAULT_PENDING_REQUEUE_SECS: u64 = 5;

/// Lower bound of every delay between passes (seconds)
pub const MIN_PASS_DELAY_SECS: u64 = 1;

/// Fibonacci backoff starting value after failed passes (seconds)
pub const DEFAULT_BACKOFF_MIN_SECS: u64 = 5;

/// Fibonacci backoff maximum value after failed passes (seconds)
pub const DEFAULT_BACKOFF_MAX_SECS: u64 = 300;

/// API group whose presence identifies an OpenShift cluster
pub const OPENSHIFT_ROUTE_API_GROUP: &str = "route.openshift.io";

/// API group whose presence identifies OpenShift 4
pub const OPENSHIFT_CONFIG_API_GROUP: &str = "config.openshift.io";
