//! # Kube-backed Object Sync
//!
//! [`ObjectSync`] on top of `kube::Api`: get the live object, create it when
//! absent, replace it when it drifted, and report `Ready` once it matches.

use crate::constants::FIELD_MANAGER;
use crate::crd::Route;
use crate::expose::{ExposeError, SyncOutcome};
use crate::sync::gateway::config_map_drifted;
use crate::sync::ingress::ingress_drifted;
use crate::sync::route::{assigned_host, preserve_assigned_host, route_drifted};
use crate::sync::{GatewayRoute, IngressObject, ObjectKind, ObjectSync, RouteObject};
use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, DeleteParams, PostParams};
use kube::{Client, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

/// Drift check between desired and live object
type DriftCheck<K> = fn(&K, &K) -> bool;

/// Adjusts the desired object before it replaces the live one
type PrepareReplace<K> = fn(&mut K, &K);

/// Object sync against the Kubernetes API in one namespace
#[derive(Clone)]
pub struct KubeObjectSync {
    client: Client,
    namespace: String,
    owner: Option<OwnerReference>,
}

impl std::fmt::Debug for KubeObjectSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeObjectSync")
            .field("namespace", &self.namespace)
            .field("owner", &self.owner.as_ref().map(|o| &o.name))
            .finish_non_exhaustive()
    }
}

impl KubeObjectSync {
    #[must_use]
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
            owner: None,
        }
    }

    /// Set the owner reference of created objects (the CheCluster), so that
    /// they are garbage collected with it
    #[must_use]
    pub fn with_owner(mut self, owner: Option<OwnerReference>) -> Self {
        self.owner = owner;
        self
    }

    fn api<K>(&self) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        K::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    async fn converge<K>(
        &self,
        kind: ObjectKind,
        desired: K,
        drifted: DriftCheck<K>,
        prepare: PrepareReplace<K>,
    ) -> SyncOutcome
    where
        K: Resource<Scope = NamespaceResourceScope>
            + Clone
            + Debug
            + Serialize
            + DeserializeOwned
            + Send
            + Sync,
        K::DynamicType: Default,
    {
        let name = desired.meta().name.clone().unwrap_or_default();
        match self.try_converge(kind, &name, desired, drifted, prepare).await {
            Ok(outcome) => outcome,
            Err(e) => SyncOutcome::Failed(ExposeError::sync(kind, name, e)),
        }
    }

    async fn try_converge<K>(
        &self,
        kind: ObjectKind,
        name: &str,
        mut desired: K,
        drifted: DriftCheck<K>,
        prepare: PrepareReplace<K>,
    ) -> Result<SyncOutcome>
    where
        K: Resource<Scope = NamespaceResourceScope>
            + Clone
            + Debug
            + Serialize
            + DeserializeOwned
            + Send
            + Sync,
        K::DynamicType: Default,
    {
        let api: Api<K> = self.api();
        let params = PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        };
        if let Some(owner) = &self.owner {
            desired.meta_mut().owner_references = Some(vec![owner.clone()]);
        }

        let live = api
            .get_opt(name)
            .await
            .with_context(|| format!("Failed to get {kind} {}/{name}", self.namespace))?;

        match live {
            None => {
                api.create(&params, &desired)
                    .await
                    .with_context(|| format!("Failed to create {kind} {}/{name}", self.namespace))?;
                info!("Created {} {}/{}", kind, self.namespace, name);
                Ok(SyncOutcome::Pending)
            }
            Some(live) if !drifted(&desired, &live) => {
                debug!("{} {}/{} is up to date", kind, self.namespace, name);
                Ok(SyncOutcome::Ready(()))
            }
            Some(live) => {
                let meta = desired.meta_mut();
                meta.resource_version.clone_from(&live.meta().resource_version);
                if meta.owner_references.is_none() {
                    meta.owner_references.clone_from(&live.meta().owner_references);
                }
                prepare(&mut desired, &live);

                api.replace(name, &params, &desired)
                    .await
                    .with_context(|| format!("Failed to update {kind} {}/{name}", self.namespace))?;
                info!("Updated drifted {} {}/{}", kind, self.namespace, name);
                Ok(SyncOutcome::Pending)
            }
        }
    }

    async fn delete<K>(&self, kind: ObjectKind, name: &str) -> Result<bool>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + Debug + DeserializeOwned,
        K::DynamicType: Default,
    {
        let api: Api<K> = self.api();
        match api.delete(name, &DeleteParams::default()).await {
            Ok(_) => {
                info!("Deleted {} {}/{}", kind, self.namespace, name);
                Ok(true)
            }
            Err(kube::Error::Api(api_err)) if api_err.code == 404 => Ok(false),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to delete {kind} {}/{name}", self.namespace)),
        }
    }
}

fn keep_desired<K>(_desired: &mut K, _live: &K) {}

#[async_trait]
impl ObjectSync for KubeObjectSync {
    async fn sync_gateway_route(&self, desired: &GatewayRoute) -> SyncOutcome {
        match desired.to_config_map(&self.namespace) {
            Ok(config_map) => {
                self.converge::<ConfigMap>(
                    ObjectKind::GatewayRoute,
                    config_map,
                    config_map_drifted,
                    keep_desired,
                )
                .await
            }
            Err(e) => SyncOutcome::Failed(ExposeError::sync(
                ObjectKind::GatewayRoute,
                desired.name.clone(),
                e,
            )),
        }
    }

    async fn sync_ingress(&self, desired: &IngressObject) -> SyncOutcome {
        self.converge::<Ingress>(
            ObjectKind::Ingress,
            desired.to_ingress(&self.namespace),
            ingress_drifted,
            keep_desired,
        )
        .await
    }

    async fn sync_route(&self, desired: &RouteObject) -> SyncOutcome {
        self.converge::<Route>(
            ObjectKind::Route,
            desired.to_route(&self.namespace),
            route_drifted,
            preserve_assigned_host,
        )
        .await
    }

    async fn delete_object(&self, kind: ObjectKind, name: &str) -> Result<bool> {
        match kind {
            ObjectKind::GatewayRoute => self.delete::<ConfigMap>(kind, name).await,
            ObjectKind::Ingress => self.delete::<Ingress>(kind, name).await,
            ObjectKind::Route => self.delete::<Route>(kind, name).await,
        }
    }

    async fn route_host(&self, name: &str) -> Result<Option<String>> {
        let api: Api<Route> = self.api();
        let route = api
            .get_opt(name)
            .await
            .with_context(|| format!("Failed to get Route {}/{name}", self.namespace))?;
        Ok(route.as_ref().and_then(assigned_host))
    }
}
