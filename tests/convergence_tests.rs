//! # Convergence Pass Tests
//!
//! Full passes over the default endpoint set, driven from a CheCluster manifest.

mod common;

use che_exposure_controller::prelude::*;
use che_exposure_controller::runtime::convergence::{
    endpoint_requests, expose_all, status_for, PassOutcome,
};
use common::FakeCluster;

const GATEWAY_CHE_CLUSTER: &str = r"
apiVersion: org.eclipse.che/v1
kind: CheCluster
metadata:
  name: eclipse-che
  namespace: che
spec:
  server:
    serverExposureStrategy: single-host
    cheHost: che.example.com
    endpointSettings:
      plugin-registry:
        ingress:
          labels:
            team: registry
  k8s:
    ingressDomain: example.com
    singleHostExposureType: gateway
";

const MULTI_HOST_CHE_CLUSTER: &str = r"
apiVersion: org.eclipse.che/v1
kind: CheCluster
metadata:
  name: eclipse-che
  namespace: che
spec:
  k8s:
    ingressDomain: example.com
    ingressStrategy: multi-host
";

fn che_cluster(manifest: &str) -> CheCluster {
    serde_yaml::from_str(manifest).expect("CheCluster manifest should parse")
}

#[tokio::test]
async fn test_gateway_pass_converges_on_second_pass() {
    let cluster = che_cluster(GATEWAY_CHE_CLUSTER);
    let config = ControllerConfig::default();
    let capabilities = PlatformCapabilities::kubernetes();
    let ctx = ExposureContext::from_cluster(&cluster, &capabilities, &config.namespace);
    assert_eq!(ctx.namespace, "che");
    assert_eq!(ctx.mode(), ExposureMode::SingleHostGateway);

    let requests = endpoint_requests(&config, &cluster).unwrap();
    let fake = FakeCluster::new();
    let exposer = Exposer::new(&fake, capabilities, config.exposure_settings());

    let first = expose_all(&exposer, &ctx, &requests).await;
    assert_eq!(first.outcome(), PassOutcome::Pending);
    assert_eq!(first.pending.len(), requests.len());
    assert!(first.endpoints.is_empty());

    let second = expose_all(&exposer, &ctx, &requests).await;
    assert_eq!(second.outcome(), PassOutcome::Converged);
    assert_eq!(second.endpoints["keycloak"], "che.example.com");
    assert_eq!(second.endpoints["plugin-registry"], "che.example.com/plugin-registry");
    assert_eq!(second.endpoints["che"], "che.example.com/che");

    let status = status_for(&second, None);
    assert_eq!(status.exposure_mode.as_deref(), Some("single-host-gateway"));
    assert_eq!(status.endpoints, second.endpoints);
    assert_eq!(status.conditions[0].reason.as_deref(), Some("Exposed"));
}

#[tokio::test]
async fn test_multi_host_pass_carries_endpoint_settings() {
    let cluster = che_cluster(MULTI_HOST_CHE_CLUSTER);
    let config = ControllerConfig::default();
    let capabilities = PlatformCapabilities::kubernetes();
    let ctx = ExposureContext::from_cluster(&cluster, &capabilities, &config.namespace);
    assert_eq!(ctx.mode(), ExposureMode::MultiHost);

    let requests = endpoint_requests(&config, &cluster).unwrap();
    let fake = FakeCluster::new();
    let exposer = Exposer::new(&fake, capabilities, config.exposure_settings());

    let _ = expose_all(&exposer, &ctx, &requests).await;
    let report = expose_all(&exposer, &ctx, &requests).await;
    assert_eq!(report.outcome(), PassOutcome::Converged);
    assert_eq!(report.endpoints["plugin-registry"], "plugin-registry-che.example.com");

    let keycloak = fake.ingress("keycloak").unwrap();
    assert!(keycloak.is_identity_endpoint);
    assert_eq!(keycloak.host, "keycloak-che.example.com");
}

#[tokio::test]
async fn test_one_failing_endpoint_does_not_block_the_others() {
    let cluster = che_cluster(GATEWAY_CHE_CLUSTER);
    let config = ControllerConfig::default();
    let capabilities = PlatformCapabilities::kubernetes();
    let ctx = ExposureContext::from_cluster(&cluster, &capabilities, &config.namespace);
    let requests = endpoint_requests(&config, &cluster).unwrap();

    let fake = FakeCluster::new();
    fake.fail_sync(ObjectKind::GatewayRoute);
    let exposer = Exposer::new(&fake, capabilities, config.exposure_settings());

    let report = expose_all(&exposer, &ctx, &requests).await;
    assert_eq!(report.outcome(), PassOutcome::Failed);
    assert_eq!(report.failed.len(), requests.len());

    let status = status_for(&report, None);
    assert_eq!(status.conditions[0].status, "False");
    assert_eq!(status.conditions[0].reason.as_deref(), Some("SyncFailed"));
    assert!(status.last_exposure_time.is_none());
}

#[test]
fn test_che_cluster_ignores_unknown_fields() {
    let manifest = format!("{GATEWAY_CHE_CLUSTER}  database:\n    externalDb: false\n");
    let cluster = che_cluster(&manifest);
    assert_eq!(cluster.spec.k8s.single_host_exposure_type.as_deref(), Some("gateway"));
    assert_eq!(
        cluster.endpoint_settings("plugin-registry").ingress.labels["team"],
        "registry"
    );
    assert_eq!(cluster.endpoint_settings("dashboard"), EndpointCustomSettings::default());
}
