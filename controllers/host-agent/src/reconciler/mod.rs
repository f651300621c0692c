//! Reconciliation logic for the host/agent enrollment controller.
//!
//! One pass over a host runs, in order: discovery-image assignment, agent
//! selection and spec sync, detached-annotation management and spoke
//! propagation. Each step is a cheap no-op when its preconditions are
//! absent, the pure planning functions live in the submodules and all host
//! mutations are collected in memory and written back once at the end.

pub mod annotations;
pub mod approval;
pub mod detach;
pub mod image;
pub mod inventory;
pub mod matching;
pub mod spoke_sync;

#[cfg(test)]
mod approval_test;
#[cfg(test)]
mod inventory_test;
#[cfg(test)]
mod matching_test;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use k8s_openapi::api::core::v1::Secret;
use kube::api::PostParams;
use kube::{Api, Client, ResourceExt};
use tracing::{debug, info, warn};

use crate::backoff::FibonacciBackoff;
use crate::error::ControllerError;
use crate::spoke;
use crds::{
    admin_kubeconfig_secret_name, Agent, BareMetalHost, DiscoveryEnv, TargetCluster,
    HOST_DETACHED_ANNOTATION, HOST_DETACHED_TRUE, HOST_HARDWARE_DETAILS_ANNOTATION,
};

/// Reconciles BareMetalHost/Agent pairs and propagates installed hosts to
/// spoke clusters.
pub struct Reconciler {
    client: Client,
    /// Per-resource retry backoff (namespace/name -> backoff state)
    backoff_states: Mutex<HashMap<String, FibonacciBackoff>>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler").finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Creates a new reconciler instance.
    pub fn new(client: Client) -> Arc<Self> {
        Arc::new(Self {
            client,
            backoff_states: Mutex::new(HashMap::new()),
        })
    }

    fn hosts(&self, namespace: &str) -> Api<BareMetalHost> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn agents(&self, namespace: &str) -> Api<Agent> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn discovery_envs(&self, namespace: &str) -> Api<DiscoveryEnv> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn target_clusters(&self, namespace: &str) -> Api<TargetCluster> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn secrets(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }

    /// Runs one full pass for a host. Level-triggered: the pass re-derives
    /// everything from current state and writes the host back at most once.
    pub async fn reconcile_host(&self, host: &BareMetalHost) -> Result<(), ControllerError> {
        let name = host
            .metadata
            .name
            .clone()
            .ok_or_else(|| ControllerError::InvalidConfig("BareMetalHost missing name".to_string()))?;
        let namespace = host.metadata.namespace.as_deref().unwrap_or("default");

        info!("Reconciling BareMetalHost {}/{}", namespace, name);

        let mut host = host.clone();
        let mut host_dirty = false;

        host_dirty |= self.assign_discovery_image(&mut host, namespace).await?;

        let agents = self.agents(namespace).list(&Default::default()).await?;
        let candidates = matching::find_agents_by_mac(&host, &agents.items);
        let selected = match approval::select_agent(candidates) {
            Some(selection) => {
                self.revoke_stale_agents(namespace, &selection.stale).await?;

                let mut agent = selection.selected.clone();
                let agent_dirty = approval::sync_agent_spec(&host, &mut agent);

                // The hardware-details annotation tracks current inventory on
                // every pass, regardless of approval state.
                if let Some(inventory) =
                    agent.status.as_ref().and_then(|status| status.inventory.as_ref())
                {
                    let details = serde_json::to_string(&inventory::hardware_details(inventory))?;
                    host_dirty |= annotations::set_annotation(
                        &mut host,
                        HOST_HARDWARE_DETAILS_ANNOTATION,
                        &details,
                    );
                }

                if agent_dirty {
                    let agent_name = agent.name_any();
                    self.agents(namespace)
                        .replace(&agent_name, &PostParams::default(), &agent)
                        .await?;
                    info!("Updated Agent {}/{}", namespace, agent_name);
                }
                Some(agent)
            }
            None => {
                debug!("No agent matches BareMetalHost {}/{}", namespace, name);
                None
            }
        };

        // Resolved before the detach step: a host bound for an installed
        // cluster keeps its detached annotation even when the spoke write
        // below fails and the pass commits early.
        let installed_cluster = match &selected {
            Some(agent) => self.installed_target_cluster(agent, namespace).await?,
            None => None,
        };

        host_dirty |=
            detach::reconcile_detached(&mut host, selected.as_ref(), installed_cluster.is_some());

        // A spoke failure must not discard host changes already planned in
        // this pass, so the write-back happens before the error surfaces.
        let spoke_result = match (&selected, &installed_cluster) {
            (Some(agent), Some(cluster)) => self
                .propagate_to_spoke(&mut host, agent, cluster, namespace)
                .await
                .map(|changed| host_dirty |= changed),
            _ => Ok(()),
        };

        if host_dirty {
            self.hosts(namespace)
                .replace(&name, &PostParams::default(), &host)
                .await?;
            info!("Updated BareMetalHost {}/{}", namespace, name);
        } else {
            debug!("BareMetalHost {}/{} already up to date", namespace, name);
        }
        spoke_result
    }

    /// Runs the host pass for the host an agent belongs to, resolved by
    /// reverse MAC match. An agent without a host yet is a successful no-op.
    pub async fn reconcile_agent(&self, agent: &Agent) -> Result<(), ControllerError> {
        let namespace = agent.metadata.namespace.as_deref().unwrap_or("default");
        let hosts = self.hosts(namespace).list(&Default::default()).await?;
        match matching::find_host_by_agent(agent, &hosts.items) {
            Some(host) => {
                let host = host.clone();
                self.reconcile_host(&host).await
            }
            None => {
                debug!(
                    "No BareMetalHost matches Agent {}/{}",
                    namespace,
                    agent.name_any()
                );
                Ok(())
            }
        }
    }

    /// Re-runs the host pass for every host labeled with a DiscoveryEnv,
    /// so hosts waiting on an image build pick up the finished ISO without
    /// polling. Every labeled host is attempted; one broken host does not
    /// starve the rest of the image re-trigger.
    pub async fn reconcile_discovery_env(&self, env: &DiscoveryEnv) -> Result<(), ControllerError> {
        let name = env.name_any();
        let namespace = env.metadata.namespace.as_deref().unwrap_or("default");
        let hosts = self.hosts(namespace).list(&Default::default()).await?;
        let labeled: Vec<BareMetalHost> = matching::find_hosts_by_discovery_env(&name, &hosts.items)
            .into_iter()
            .cloned()
            .collect();
        if labeled.is_empty() {
            debug!("No BareMetalHost references DiscoveryEnv {}/{}", namespace, name);
        }
        let mut results = Vec::with_capacity(labeled.len());
        for host in labeled {
            let result = self.reconcile_host(&host).await;
            if let Err(e) = &result {
                warn!(
                    "Failed to reconcile BareMetalHost {}/{} for DiscoveryEnv {}: {}",
                    namespace,
                    host.name_any(),
                    name,
                    e
                );
            }
            results.push(result);
        }
        first_failure(results)
    }

    /// Discovery-image assignment: applies the env's ISO to the host once
    /// built. A missing env or an unfinished build ends the step without a
    /// mutation; the DiscoveryEnv watcher re-triggers the host later.
    async fn assign_discovery_image(
        &self,
        host: &mut BareMetalHost,
        namespace: &str,
    ) -> Result<bool, ControllerError> {
        let Some(env_name) = matching::discovery_env_name(host).map(str::to_string) else {
            return Ok(false);
        };
        let env = match self.discovery_envs(namespace).get(&env_name).await {
            Ok(env) => env,
            Err(kube::Error::Api(ae)) if ae.code == 404 => {
                debug!("DiscoveryEnv {}/{} not found", namespace, env_name);
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };
        let iso_url = env
            .status
            .as_ref()
            .map(|status| status.iso_download_url.as_str())
            .unwrap_or_default();
        if iso_url.is_empty() {
            debug!(
                "DiscoveryEnv {}/{} has no image yet, waiting for the build",
                namespace, env_name
            );
            return Ok(false);
        }
        Ok(image::apply_discovery_image(host, iso_url))
    }

    /// Un-approves previously approved agents that lost the tie-break, so
    /// stale duplicates never remain eligible for installation.
    async fn revoke_stale_agents(
        &self,
        namespace: &str,
        stale: &[&Agent],
    ) -> Result<(), ControllerError> {
        for agent in stale {
            if !agent.spec.approved {
                continue;
            }
            let mut revoked = (*agent).clone();
            revoked.spec.approved = false;
            let agent_name = revoked.name_any();
            self.agents(namespace)
                .replace(&agent_name, &PostParams::default(), &revoked)
                .await?;
            info!("Revoked approval of stale Agent {}/{}", namespace, agent_name);
        }
        Ok(())
    }

    /// Resolves the installed TargetCluster the agent is destined for.
    /// No cluster reference, a missing cluster or one still installing all
    /// resolve to None.
    async fn installed_target_cluster(
        &self,
        agent: &Agent,
        namespace: &str,
    ) -> Result<Option<TargetCluster>, ControllerError> {
        let Some(cluster_ref) = agent.spec.cluster_ref.as_ref() else {
            return Ok(None);
        };
        let cluster_namespace = cluster_ref.namespace.as_deref().unwrap_or(namespace);
        let cluster = match self.target_clusters(cluster_namespace).get(&cluster_ref.name).await {
            Ok(cluster) => cluster,
            Err(kube::Error::Api(ae)) if ae.code == 404 => {
                debug!(
                    "TargetCluster {}/{} not found",
                    cluster_namespace, cluster_ref.name
                );
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        if !cluster.spec.installed {
            debug!(
                "TargetCluster {}/{} not installed yet",
                cluster_namespace, cluster_ref.name
            );
            return Ok(None);
        }
        Ok(Some(cluster))
    }

    /// Spoke propagation: duplicates the host, machine and credential
    /// secret into the installed cluster's store and permanently detaches
    /// the management-side host. Returns whether the host changed.
    async fn propagate_to_spoke(
        &self,
        host: &mut BareMetalHost,
        agent: &Agent,
        cluster: &TargetCluster,
        namespace: &str,
    ) -> Result<bool, ControllerError> {
        let cluster_name = cluster.name_any();
        let cluster_namespace = cluster.metadata.namespace.as_deref().unwrap_or(namespace);
        let secret_name = admin_kubeconfig_secret_name(&cluster_name);
        let admin_secret = self
            .secrets(cluster_namespace)
            .get(&secret_name)
            .await
            .map_err(|e| {
                ControllerError::SpokeCluster(format!(
                    "failed to read admin kubeconfig secret {cluster_namespace}/{secret_name}: {e}"
                ))
            })?;

        let spoke_client = spoke::client_from_secret(&admin_secret).await?;
        spoke_sync::propagate(spoke_client, host, agent, &cluster_name, &admin_secret).await?;

        // Terminal, one-way transition: the management side never
        // re-provisions a migrated host.
        Ok(annotations::set_annotation(
            host,
            HOST_DETACHED_ANNOTATION,
            HOST_DETACHED_TRUE,
        ))
    }

    /// Next retry delay for a resource after a failed pass.
    pub fn next_backoff(&self, resource_key: &str) -> Duration {
        match self.backoff_states.lock() {
            Ok(mut states) => states
                .entry(resource_key.to_string())
                .or_insert_with(|| FibonacciBackoff::new(1, 10))
                .next_backoff(),
            Err(e) => {
                warn!("Failed to lock backoff states: {}, using default backoff", e);
                Duration::from_secs(60)
            }
        }
    }

    /// Resets the retry backoff after a successful pass.
    pub fn reset_backoff(&self, resource_key: &str) {
        if let Ok(mut states) = self.backoff_states.lock()
            && let Some(state) = states.get_mut(resource_key)
        {
            state.reset();
        }
    }
}

/// Folds per-host pass results into one: every host was attempted, the
/// first failure (if any) is what gets retried.
fn first_failure(
    results: impl IntoIterator<Item = Result<(), ControllerError>>,
) -> Result<(), ControllerError> {
    let mut first = None;
    for result in results {
        if let Err(e) = result
            && first.is_none()
        {
            first = Some(e);
        }
    }
    match first {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
