//! Spoke-cluster client construction.
//!
//! The management store and the spoke store are the same kind of API
//! server; a spoke client is just a second `kube::Client` built from the
//! admin kubeconfig the installation tooling publishes as a secret.

use k8s_openapi::api::core::v1::Secret;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

use crate::error::ControllerError;
use crds::KUBECONFIG_SECRET_KEY;

/// Builds a client for the spoke cluster from its admin kubeconfig secret.
pub async fn client_from_secret(secret: &Secret) -> Result<Client, ControllerError> {
    let name = secret.metadata.name.as_deref().unwrap_or_default();
    let bytes = secret
        .data
        .as_ref()
        .and_then(|data| data.get(KUBECONFIG_SECRET_KEY))
        .ok_or_else(|| {
            ControllerError::SpokeCluster(format!(
                "secret {name} has no '{KUBECONFIG_SECRET_KEY}' key"
            ))
        })?;
    let kubeconfig: Kubeconfig = serde_yaml::from_slice(&bytes.0).map_err(|e| {
        ControllerError::SpokeCluster(format!("secret {name} holds an invalid kubeconfig: {e}"))
    })?;
    let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| ControllerError::SpokeCluster(format!("failed to build spoke config: {e}")))?;
    Client::try_from(config)
        .map_err(|e| ControllerError::SpokeCluster(format!("failed to build spoke client: {e}")))
}
