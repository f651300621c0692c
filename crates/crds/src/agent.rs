//! Agent CRD
//!
//! Represents one running discovery process on a booted host. The agent
//! writes its own inventory and conditions; the enrollment controllers own
//! the spec fields (approval, installation configuration) and the
//! back-reference label to the matched BareMetalHost.

use chrono::{DateTime, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::references::ClusterReference;

/// Label on an Agent naming the BareMetalHost it was matched to.
pub const AGENT_HOST_LABEL: &str = "agent.enrollops.io/host";

/// Condition type reporting installation progress, produced by the
/// installation tooling and read-only here.
pub const INSTALLED_CONDITION: &str = "Installed";

/// Installation has not started yet
pub const INSTALLATION_NOT_STARTED_REASON: &str = "InstallationNotStarted";

/// Installation is running
pub const INSTALLATION_IN_PROGRESS_REASON: &str = "InstallationInProgress";

/// Installation failed
pub const INSTALLATION_FAILED_REASON: &str = "InstallationFailed";

/// Installation completed
pub const INSTALLED_REASON: &str = "Installed";

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[kube(
    group = "enrollops.io",
    version = "v1alpha1",
    kind = "Agent",
    namespaced,
    status = "AgentStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct AgentSpec {
    /// Gate for installation tooling; once true the agent may be installed
    #[serde(default)]
    pub approved: bool,

    /// Installation role, e.g. "master" or "worker"
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub role: String,

    /// Requested hostname
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hostname: String,

    /// Machine config pool the node joins
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub machine_config_pool: String,

    /// Extra installer arguments as a JSON string array
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub installer_args: String,

    /// Ignition config overrides passed to the installer
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ignition_config_overrides: String,

    /// Id of the disk selected for installation; empty until root device
    /// hints on the matched host resolve against reported inventory
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub installation_disk_id: String,

    /// Target cluster this agent is destined to join; set by installation
    /// tooling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_ref: Option<ClusterReference>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatus {
    /// Hardware snapshot reported by the discovery process; absent until
    /// the first report arrives
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<AgentInventory>,

    /// Conditions reported by installation tooling
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<AgentCondition>,
}

/// Hardware inventory as reported by the discovery agent
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct AgentInventory {
    /// When the agent produced this report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_time: Option<DateTime<Utc>>,

    /// Memory sizes
    #[serde(default)]
    pub memory: AgentMemory,

    /// CPU description
    #[serde(default)]
    pub cpu: AgentCpu,

    /// Network interfaces
    #[serde(default)]
    pub interfaces: Vec<AgentInterface>,

    /// Storage devices
    #[serde(default)]
    pub disks: Vec<AgentDisk>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct AgentMemory {
    /// Physical memory in bytes
    #[serde(default)]
    pub physical_bytes: i64,

    /// Usable memory in bytes
    #[serde(default)]
    pub usable_bytes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct AgentCpu {
    /// Core count
    #[serde(default)]
    pub count: i64,

    /// Architecture, e.g. "x86_64"
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub architecture: String,

    /// Model name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct AgentInterface {
    /// Interface name, e.g. "eth0"
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Interface MAC address
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mac_address: String,

    /// IPv4 addresses assigned to the interface
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ipv4_addresses: Vec<String>,

    /// IPv6 addresses assigned to the interface
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ipv6_addresses: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct AgentDisk {
    /// Stable device identifier
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// Device path, e.g. "/dev/sda"
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,

    /// Drive type string, e.g. "SSD" or "HDD"
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub drive_type: String,

    /// Device size in bytes
    #[serde(default)]
    pub size_bytes: i64,

    /// Whether the device is bootable
    #[serde(default)]
    pub bootable: bool,

    /// Device vendor string
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub vendor: String,

    /// Device model string
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,

    /// Device serial number
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub serial: String,

    /// Device WWN
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub wwn: String,

    /// Whether the device is eligible for installation
    #[serde(default)]
    pub eligible: bool,
}

/// Condition on an Agent, in the usual Kubernetes shape
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AgentCondition {
    /// Condition type, e.g. [`INSTALLED_CONDITION`]
    #[serde(rename = "type")]
    pub condition_type: String,

    /// "True", "False" or "Unknown"
    pub status: String,

    /// Machine-readable reason
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,

    /// Human-readable message
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}
