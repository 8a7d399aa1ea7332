//! Common test utilities for exposure tests
//!
//! Provides an in-memory [`ObjectSync`] that mimics the kube-backed one:
//! a create or an update answers `Pending`, an unchanged object answers
//! `Ready`. Failures can be scripted per object kind.

#![allow(dead_code, reason = "not every test binary uses every helper")]

use async_trait::async_trait;
use che_exposure_controller::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
struct State {
    gateway_routes: BTreeMap<String, GatewayRoute>,
    ingresses: BTreeMap<String, IngressObject>,
    routes: BTreeMap<String, RouteObject>,
    assigned_hosts: BTreeMap<String, String>,
    failing_syncs: HashSet<ObjectKind>,
    failing_deletes: HashSet<ObjectKind>,
    failing_route_lookup: bool,
    calls: Vec<String>,
    writes: usize,
}

/// In-memory cluster namespace
#[derive(Default)]
pub struct FakeCluster {
    state: Mutex<State>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every sync of `kind` fail
    pub fn fail_sync(&self, kind: ObjectKind) {
        self.state.lock().unwrap().failing_syncs.insert(kind);
    }

    pub fn heal_sync(&self, kind: ObjectKind) {
        self.state.lock().unwrap().failing_syncs.remove(&kind);
    }

    /// Make every delete of `kind` fail
    pub fn fail_delete(&self, kind: ObjectKind) {
        self.state.lock().unwrap().failing_deletes.insert(kind);
    }

    pub fn fail_route_lookup(&self) {
        self.state.lock().unwrap().failing_route_lookup = true;
    }

    /// Simulate the platform admitting a route under `host`
    pub fn assign_route_host(&self, name: &str, host: &str) {
        self.state
            .lock()
            .unwrap()
            .assigned_hosts
            .insert(name.to_string(), host.to_string());
    }

    pub fn has(&self, kind: ObjectKind, name: &str) -> bool {
        let state = self.state.lock().unwrap();
        match kind {
            ObjectKind::GatewayRoute => state.gateway_routes.contains_key(name),
            ObjectKind::Ingress => state.ingresses.contains_key(name),
            ObjectKind::Route => state.routes.contains_key(name),
        }
    }

    pub fn gateway_route(&self, name: &str) -> Option<GatewayRoute> {
        self.state.lock().unwrap().gateway_routes.get(name).cloned()
    }

    pub fn ingress(&self, name: &str) -> Option<IngressObject> {
        self.state.lock().unwrap().ingresses.get(name).cloned()
    }

    pub fn route(&self, name: &str) -> Option<RouteObject> {
        self.state.lock().unwrap().routes.get(name).cloned()
    }

    /// Every call made so far, e.g. `sync Ingress che` or `delete Route che`
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("delete "))
            .collect()
    }

    /// Number of creates, updates and deletes
    pub fn writes(&self) -> usize {
        self.state.lock().unwrap().writes
    }

    fn converge<T: Clone + PartialEq>(
        state: &mut State,
        kind: ObjectKind,
        name: &str,
        desired: &T,
        select: fn(&mut State) -> &mut BTreeMap<String, T>,
    ) -> SyncOutcome {
        state.calls.push(format!("sync {kind:?} {name}"));
        if state.failing_syncs.contains(&kind) {
            return SyncOutcome::Failed(ExposeError::sync(
                kind,
                name,
                anyhow::anyhow!("injected sync failure"),
            ));
        }
        let objects = select(state);
        if objects.get(name) == Some(desired) {
            return SyncOutcome::Ready(());
        }
        objects.insert(name.to_string(), desired.clone());
        state.writes += 1;
        SyncOutcome::Pending
    }
}

#[async_trait]
impl ObjectSync for FakeCluster {
    async fn sync_gateway_route(&self, desired: &GatewayRoute) -> SyncOutcome {
        let mut state = self.state.lock().unwrap();
        Self::converge(
            &mut state,
            ObjectKind::GatewayRoute,
            &desired.name,
            desired,
            |s| &mut s.gateway_routes,
        )
    }

    async fn sync_ingress(&self, desired: &IngressObject) -> SyncOutcome {
        let mut state = self.state.lock().unwrap();
        Self::converge(
            &mut state,
            ObjectKind::Ingress,
            &desired.name,
            desired,
            |s| &mut s.ingresses,
        )
    }

    async fn sync_route(&self, desired: &RouteObject) -> SyncOutcome {
        let mut state = self.state.lock().unwrap();
        Self::converge(
            &mut state,
            ObjectKind::Route,
            &desired.name,
            desired,
            |s| &mut s.routes,
        )
    }

    async fn delete_object(&self, kind: ObjectKind, name: &str) -> anyhow::Result<bool> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("delete {kind:?} {name}"));
        if state.failing_deletes.contains(&kind) {
            anyhow::bail!("injected delete failure");
        }
        let existed = match kind {
            ObjectKind::GatewayRoute => state.gateway_routes.remove(name).is_some(),
            ObjectKind::Ingress => state.ingresses.remove(name).is_some(),
            ObjectKind::Route => state.routes.remove(name).is_some(),
        };
        if existed {
            state.writes += 1;
        }
        Ok(existed)
    }

    async fn route_host(&self, name: &str) -> anyhow::Result<Option<String>> {
        let state = self.state.lock().unwrap();
        if state.failing_route_lookup {
            anyhow::bail!("injected route lookup failure");
        }
        let Some(route) = state.routes.get(name) else {
            return Ok(None);
        };
        Ok(route
            .host
            .clone()
            .or_else(|| state.assigned_hosts.get(name).cloned()))
    }
}

/// Context of namespace `ns1` on `che.example.com` / `example.com`
pub fn context(strategy: ExposureStrategy, gateway: bool, platform_capable: bool) -> ExposureContext {
    ExposureContext {
        namespace: "ns1".to_string(),
        config: ExposureConfig {
            strategy,
            single_host_gateway_enabled: gateway,
            platform_capable,
        },
        base_host: "che.example.com".to_string(),
        ingress_domain: "example.com".to_string(),
        ingress_class: "nginx".to_string(),
        tls_enabled: false,
        tls_secret_name: None,
        app_name: "che".to_string(),
    }
}

/// Call `expose` until it stops answering `Pending`, at most `max` times
pub async fn expose_until_settled<S: ObjectSync + ?Sized>(
    exposer: &Exposer<'_, S>,
    ctx: &ExposureContext,
    endpoint: &EndpointRequest,
    max: usize,
) -> SyncOutcome<String> {
    for _ in 1..max {
        let outcome = exposer.expose(ctx, endpoint).await;
        if !outcome.is_pending() {
            return outcome;
        }
    }
    exposer.expose(ctx, endpoint).await
}
