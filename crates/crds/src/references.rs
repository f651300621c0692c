//! Cross-object references shared by the Enrollops CRDs.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reference to a TargetCluster
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClusterReference {
    /// Name of the TargetCluster
    pub name: String,

    /// Namespace (defaults to the same namespace as the referrer)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}
