//! Main controller implementation.
//!
//! This module contains the `Controller` struct that orchestrates
//! reconciliation and resource watching for the host/agent enrollment
//! controller.
//!
//! The controller watches three CRD types:
//! - BareMetalHost: discovery image assignment and detach management
//! - Agent: approval, spec sync and inventory translation
//! - DiscoveryEnv: re-triggers hosts once an image build finishes

use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crate::watcher::Watcher;
use crds::{Agent, BareMetalHost, DiscoveryEnv};
use kube::{Api, Client};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Main controller for host enrollment.
pub struct Controller {
    host_watcher: JoinHandle<Result<(), ControllerError>>,
    agent_watcher: JoinHandle<Result<(), ControllerError>>,
    discovery_env_watcher: JoinHandle<Result<(), ControllerError>>,
}

impl Controller {
    /// Creates a new controller instance.
    pub async fn new(namespace: Option<String>) -> Result<Self, ControllerError> {
        info!("Initializing host enrollment controller");

        let kube_client = Client::try_default().await?;

        let ns = namespace.as_deref().unwrap_or("default");
        let host_api: Api<BareMetalHost> = Api::namespaced(kube_client.clone(), ns);
        let agent_api: Api<Agent> = Api::namespaced(kube_client.clone(), ns);
        let discovery_env_api: Api<DiscoveryEnv> = Api::namespaced(kube_client.clone(), ns);

        let reconciler = Reconciler::new(kube_client);

        let watcher_instance = Arc::new(Watcher::new(
            reconciler,
            host_api,
            agent_api,
            discovery_env_api,
        ));

        let host_watcher = {
            let watcher = watcher_instance.clone();
            tokio::spawn(async move { watcher.watch_hosts().await })
        };

        let agent_watcher = {
            let watcher = watcher_instance.clone();
            tokio::spawn(async move { watcher.watch_agents().await })
        };

        let discovery_env_watcher = {
            let watcher = watcher_instance;
            tokio::spawn(async move { watcher.watch_discovery_envs().await })
        };

        Ok(Self {
            host_watcher,
            agent_watcher,
            discovery_env_watcher,
        })
    }

    /// Runs the controller until shutdown.
    pub async fn run(mut self) -> Result<(), ControllerError> {
        info!("Host enrollment controller running");

        // Wait for any watcher to exit (they should run forever)
        tokio::select! {
            result = &mut self.host_watcher => {
                result.map_err(|e| ControllerError::Watch(format!("BareMetalHost watcher panicked: {}", e)))?
                    .map_err(|e| ControllerError::Watch(format!("BareMetalHost watcher error: {}", e)))?;
            }
            result = &mut self.agent_watcher => {
                result.map_err(|e| ControllerError::Watch(format!("Agent watcher panicked: {}", e)))?
                    .map_err(|e| ControllerError::Watch(format!("Agent watcher error: {}", e)))?;
            }
            result = &mut self.discovery_env_watcher => {
                result.map_err(|e| ControllerError::Watch(format!("DiscoveryEnv watcher panicked: {}", e)))?
                    .map_err(|e| ControllerError::Watch(format!("DiscoveryEnv watcher error: {}", e)))?;
            }
        }

        Ok(())
    }
}
