//! TargetCluster CRD
//!
//! Represents the cluster an agent is destined to join. Read-only to the
//! enrollment controllers; installation tooling flips `installed` once the
//! cluster is up and publishes its admin kubeconfig as a secret named by
//! [`admin_kubeconfig_secret_name`].

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Key inside the admin kubeconfig secret holding the kubeconfig bytes.
pub const KUBECONFIG_SECRET_KEY: &str = "kubeconfig";

/// Name of the secret holding the admin kubeconfig for a cluster.
pub fn admin_kubeconfig_secret_name(cluster_name: &str) -> String {
    format!("{cluster_name}-admin-kubeconfig")
}

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[kube(
    group = "enrollops.io",
    version = "v1alpha1",
    kind = "TargetCluster",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct TargetClusterSpec {
    /// Base DNS domain of the cluster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_domain: Option<String>,

    /// True once the cluster has finished installing and its own API store
    /// can take over host lifecycle management
    #[serde(default)]
    pub installed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_kubeconfig_secret_name() {
        assert_eq!(
            admin_kubeconfig_secret_name("test-cluster"),
            "test-cluster-admin-kubeconfig"
        );
    }
}
