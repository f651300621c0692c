//! Machine CRD
//!
//! Compute-machine record created in the spoke cluster's store during host
//! migration, named `<cluster>-<host>` and labeled with the cluster
//! identity and the agent's installation role.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Label tying a Machine to its cluster.
pub const MACHINE_CLUSTER_ID_LABEL: &str = "machine.enrollops.io/cluster-id";

/// Label carrying the machine's installation role.
pub const MACHINE_ROLE_LABEL: &str = "machine.enrollops.io/cluster-machine-role";

/// Legacy alias of [`MACHINE_ROLE_LABEL`], kept for compatibility.
pub const MACHINE_TYPE_LABEL: &str = "machine.enrollops.io/cluster-machine-type";

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[kube(
    group = "enrollops.io",
    version = "v1alpha1",
    kind = "Machine",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct MachineSpec {
    /// Provider-assigned node identifier, set by the spoke's own machine
    /// controllers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
}
