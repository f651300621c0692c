//! Kubernetes resource watchers.
//!
//! This module handles watching BareMetalHost, Agent and DiscoveryEnv
//! resources for changes and triggering reconciliation using
//! kube_runtime::Controller.
//!
//! All watchers use a generic `watch_resource()` helper that properly handles
//! the reconcile loop with automatic reconnection and retry logic.

use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crds::{Agent, BareMetalHost, DiscoveryEnv};
use futures::StreamExt;
use kube::{Api, ResourceExt};
use kube_runtime::{
    controller::{Action, Config as ControllerConfig},
    watcher, Controller,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Generic watcher helper built on kube_runtime::Controller.
///
/// - Controller handles automatic reconnection of the watch stream
/// - Failed passes are requeued with the reconciler's per-resource backoff
/// - Successful passes reset that backoff and wait for the next change
///
/// The reconcile_fn should match the reconciler's function signature:
/// `async fn reconcile(&self, resource: &K) -> Result<(), ControllerError>`
async fn watch_resource<K, F>(
    api: Api<K>,
    reconciler: Arc<Reconciler>,
    reconcile_fn: F,
    resource_name: &str,
) -> Result<(), ControllerError>
where
    K: kube::Resource + Clone + Send + Sync + 'static + std::fmt::Debug + serde::de::DeserializeOwned,
    K::DynamicType: Default + std::cmp::Eq + std::hash::Hash + Clone + std::fmt::Debug + Unpin,
    F: Fn(Arc<Reconciler>, Arc<K>) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), ControllerError>> + Send>> + Send + Sync + Clone + 'static,
{
    info!("Starting {} watcher", resource_name);

    // Error policy: requeue with the per-resource Fibonacci backoff.
    // Write conflicts are transient and retried quickly without advancing it.
    let error_resource_name = resource_name.to_string();
    let error_policy = move |obj: Arc<K>, error: &ControllerError, ctx: Arc<Reconciler>| {
        if error.is_conflict() {
            debug!(
                "Write conflict for {} {}, retrying against fresh state",
                error_resource_name,
                obj.name_any()
            );
            return Action::requeue(Duration::from_secs(1));
        }
        let key = format!(
            "{}/{}/{}",
            error_resource_name,
            obj.namespace().unwrap_or_default(),
            obj.name_any()
        );
        let delay = ctx.next_backoff(&key);
        error!(
            "Reconciliation error for {} {}: {}, retrying in {:?}",
            error_resource_name,
            obj.name_any(),
            error,
            delay
        );
        Action::requeue(delay)
    };

    let reconcile = move |obj: Arc<K>, ctx: Arc<Reconciler>| {
        let reconcile_fn = reconcile_fn.clone();
        let resource_name = resource_name.to_string();
        async move {
            debug!("Reconciling {} {}", resource_name, obj.name_any());
            let key = format!(
                "{}/{}/{}",
                resource_name,
                obj.namespace().unwrap_or_default(),
                obj.name_any()
            );
            match reconcile_fn(ctx.clone(), obj).await {
                Ok(()) => {
                    ctx.reset_backoff(&key);
                    Ok(Action::await_change())
                }
                Err(e) => {
                    error!("Reconciliation failed for {}: {}", resource_name, e);
                    Err(e)
                }
            }
        }
    };

    // Debounce batches the bursts of status updates agents produce during
    // discovery; concurrency keeps API load bounded across the watchers.
    let controller_config = ControllerConfig::default()
        .debounce(Duration::from_secs(5))
        .concurrency(3);

    Controller::new(api, watcher::Config::default())
        .with_config(controller_config)
        .run(reconcile, error_policy, reconciler)
        .for_each(|res| async move {
            if let Err(e) = res {
                error!("Controller error for {}: {}", resource_name, e);
            }
        })
        .await;

    Ok(())
}

/// Watches Kubernetes resources for changes.
pub struct Watcher {
    reconciler: Arc<Reconciler>,
    host_api: Api<BareMetalHost>,
    agent_api: Api<Agent>,
    discovery_env_api: Api<DiscoveryEnv>,
}

impl Watcher {
    /// Creates a new watcher instance.
    pub fn new(
        reconciler: Arc<Reconciler>,
        host_api: Api<BareMetalHost>,
        agent_api: Api<Agent>,
        discovery_env_api: Api<DiscoveryEnv>,
    ) -> Self {
        Self {
            reconciler,
            host_api,
            agent_api,
            discovery_env_api,
        }
    }

    /// Starts watching BareMetalHost resources.
    pub async fn watch_hosts(&self) -> Result<(), ControllerError> {
        watch_resource(
            self.host_api.clone(),
            self.reconciler.clone(),
            |reconciler, resource| {
                Box::pin(async move { reconciler.reconcile_host(&resource).await })
            },
            "BareMetalHost",
        )
        .await
    }

    /// Starts watching Agent resources. Agent events re-run the pass for
    /// the host the agent matches by MAC.
    pub async fn watch_agents(&self) -> Result<(), ControllerError> {
        watch_resource(
            self.agent_api.clone(),
            self.reconciler.clone(),
            |reconciler, resource| {
                Box::pin(async move { reconciler.reconcile_agent(&resource).await })
            },
            "Agent",
        )
        .await
    }

    /// Starts watching DiscoveryEnv resources. A finished image build
    /// re-runs the pass for every host labeled with the env.
    pub async fn watch_discovery_envs(&self) -> Result<(), ControllerError> {
        watch_resource(
            self.discovery_env_api.clone(),
            self.reconciler.clone(),
            |reconciler, resource| {
                Box::pin(async move { reconciler.reconcile_discovery_env(&resource).await })
            },
            "DiscoveryEnv",
        )
        .await
    }
}
