//! DiscoveryEnv CRD
//!
//! Named configuration that produces a bootable discovery image. Read-only
//! to the enrollment controllers; the image builder owns the status.

use chrono::{DateTime, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[kube(
    group = "enrollops.io",
    version = "v1alpha1",
    kind = "DiscoveryEnv",
    namespaced,
    status = "DiscoveryEnvStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryEnvSpec {
    /// SSH public key baked into the discovery image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_authorized_key: Option<String>,

    /// Additional NTP sources for booted hosts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_ntp_sources: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryEnvStatus {
    /// Download URL of the built discovery ISO; empty until the build
    /// completes
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub iso_download_url: String,

    /// When the current image was built
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,
}
