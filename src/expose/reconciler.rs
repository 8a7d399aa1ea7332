//! # Exposure Reconciler
//!
//! Converges the exposure of one endpoint: syncs the object of the active
//! mechanism (gateway route entry, Route or Ingress) and, once it is ready,
//! removes the object of the inactive one.
//!
//! The order is fixed: the inactive mechanism is only removed after the
//! active one reported `Ready`, so a strategy switch never leaves an endpoint
//! unreachable. Each call is independent and safe to repeat.

use crate::constants::DEFAULT_GATEWAY_CONFIG_PREFIX;
use crate::expose::{
    compute_address, EndpointAddress, EndpointRequest, ExposeError, ExposureContext, ExposureMode,
    PlatformCapabilities, SyncOutcome,
};
use crate::observability::metrics;
use crate::sync::{GatewayRoute, IngressObject, ObjectKind, ObjectSync, RouteObject};
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Process-wide settings of the reconciler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposureSettings {
    /// Offline mode; cleanup failures are only logged at debug level
    pub test_mode: bool,
    /// Prefix of gateway route ConfigMap names
    pub gateway_config_prefix: String,
}

impl Default for ExposureSettings {
    fn default() -> Self {
        Self {
            test_mode: false,
            gateway_config_prefix: DEFAULT_GATEWAY_CONFIG_PREFIX.to_string(),
        }
    }
}

/// Exposes endpoints through an [`ObjectSync`]
pub struct Exposer<'a, S: ObjectSync + ?Sized> {
    sync: &'a S,
    capabilities: PlatformCapabilities,
    settings: ExposureSettings,
}

impl<S: ObjectSync + ?Sized> std::fmt::Debug for Exposer<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exposer")
            .field("capabilities", &self.capabilities)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<'a, S: ObjectSync + ?Sized> Exposer<'a, S> {
    #[must_use]
    pub fn new(sync: &'a S, capabilities: PlatformCapabilities, settings: ExposureSettings) -> Self {
        Self {
            sync,
            capabilities,
            settings,
        }
    }

    /// Name of the gateway route ConfigMap of an endpoint
    #[must_use]
    pub fn gateway_config_name(&self, endpoint: &str) -> String {
        format!("{}{}", self.settings.gateway_config_prefix, endpoint)
    }

    /// Kind of the direct exposure object on this platform
    #[must_use]
    pub fn direct_kind(&self) -> ObjectKind {
        if self.capabilities.is_openshift() {
            ObjectKind::Route
        } else {
            ObjectKind::Ingress
        }
    }

    /// Expose one endpoint
    ///
    /// Returns `Ready(address)` once the endpoint is reachable, `Pending` while
    /// the active mechanism is still converging and `Failed` when the sync
    /// attempt itself failed. Callers retry on `Pending` and `Failed`.
    pub async fn expose(
        &self,
        ctx: &ExposureContext,
        endpoint: &EndpointRequest,
    ) -> SyncOutcome<String> {
        let mode = ctx.mode();
        let span = info_span!(
            "expose",
            endpoint.name = %endpoint.name(),
            endpoint.mode = %mode,
        );
        self.expose_in_mode(ctx, endpoint, mode).instrument(span).await
    }

    async fn expose_in_mode(
        &self,
        ctx: &ExposureContext,
        endpoint: &EndpointRequest,
        mode: ExposureMode,
    ) -> SyncOutcome<String> {
        metrics::increment_reconciliations(mode.as_str());
        let address = compute_address(
            endpoint,
            mode,
            &ctx.base_host,
            &ctx.namespace,
            &ctx.ingress_domain,
        );

        let (active_kind, outcome) = if mode.uses_gateway() {
            let route = self.gateway_route(ctx, endpoint, &address);
            (
                ObjectKind::GatewayRoute,
                self.sync.sync_gateway_route(&route).await,
            )
        } else if self.capabilities.is_openshift() {
            let route = route_object(ctx, endpoint);
            (ObjectKind::Route, self.sync.sync_route(&route).await)
        } else {
            let ingress = ingress_object(ctx, endpoint, &address, mode);
            (ObjectKind::Ingress, self.sync.sync_ingress(&ingress).await)
        };
        metrics::record_sync_outcome(active_kind.as_str(), outcome.as_str());

        match outcome {
            SyncOutcome::Ready(()) => {}
            SyncOutcome::Pending => {
                debug!("{} of '{}' is still converging", active_kind, endpoint.name());
                return SyncOutcome::Pending;
            }
            SyncOutcome::Failed(err) => {
                warn!("Failed to expose '{}': {}", endpoint.name(), err);
                return SyncOutcome::Failed(err);
            }
        }

        if mode.uses_gateway() {
            self.cleanup(self.direct_kind(), endpoint.name()).await;
        } else {
            self.cleanup(
                ObjectKind::GatewayRoute,
                &self.gateway_config_name(endpoint.name()),
            )
            .await;
        }

        if active_kind == ObjectKind::Route {
            // The platform-assigned host is authoritative for routes
            return match self.sync.route_host(endpoint.name()).await {
                Ok(Some(host)) => SyncOutcome::Ready(host),
                Ok(None) => {
                    debug!("Route '{}' has no assigned host yet", endpoint.name());
                    SyncOutcome::Pending
                }
                Err(source) => SyncOutcome::Failed(ExposeError::RouteLookup {
                    name: endpoint.name().to_string(),
                    source,
                }),
            };
        }

        SyncOutcome::Ready(address.address)
    }

    /// Remove an object of the inactive mechanism
    ///
    /// Never fails: errors are logged and counted, and the next call retries.
    async fn cleanup(&self, kind: ObjectKind, name: &str) {
        match self.sync.delete_object(kind, name).await {
            Ok(true) => info!("Removed {} '{}' of the inactive exposure mechanism", kind, name),
            Ok(false) => {}
            Err(source) => {
                metrics::increment_cleanup_errors(kind.as_str());
                let err = ExposeError::Cleanup {
                    kind,
                    name: name.to_string(),
                    source,
                };
                if self.settings.test_mode {
                    debug!("{}", err);
                } else {
                    error!("{}", err);
                }
            }
        }
    }

    fn gateway_route(
        &self,
        ctx: &ExposureContext,
        endpoint: &EndpointRequest,
        address: &EndpointAddress,
    ) -> GatewayRoute {
        GatewayRoute::new(
            self.gateway_config_name(endpoint.name()),
            &address.path_prefix,
            format!("http://{}:{}", endpoint.name(), endpoint.target_port()),
            address.strip_prefix,
            ctx.app_name.clone(),
        )
    }
}

fn route_object(ctx: &ExposureContext, endpoint: &EndpointRequest) -> RouteObject {
    let settings = endpoint.route_settings();
    let host = settings
        .domain
        .as_deref()
        .filter(|domain| !domain.is_empty())
        .map(|domain| format!("{}-{}.{}", endpoint.name(), ctx.namespace, domain));

    RouteObject {
        name: endpoint.name().to_string(),
        service_port: endpoint.target_port(),
        host,
        path: None,
        tls_enabled: ctx.tls_enabled,
        component: endpoint.component().to_string(),
        app_name: ctx.app_name.clone(),
        custom_labels: settings.labels.clone(),
        custom_annotations: settings.annotations.clone(),
    }
}

fn ingress_object(
    ctx: &ExposureContext,
    endpoint: &EndpointRequest,
    address: &EndpointAddress,
    mode: ExposureMode,
) -> IngressObject {
    IngressObject {
        name: endpoint.name().to_string(),
        host: address.domain.clone(),
        path_prefix: address.path_prefix.clone(),
        strip_prefix: address.strip_prefix,
        single_host: mode.is_single_host(),
        is_identity_endpoint: endpoint.is_identity_endpoint(),
        service_port: endpoint.target_port(),
        component: endpoint.component().to_string(),
        app_name: ctx.app_name.clone(),
        ingress_class: ctx.ingress_class.clone(),
        tls_enabled: ctx.tls_enabled,
        tls_secret_name: ctx.tls_secret_name.clone(),
        custom: endpoint.ingress_settings().clone(),
    }
}
