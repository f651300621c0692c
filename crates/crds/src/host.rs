//! BareMetalHost CRD
//!
//! Represents a physical machine under out-of-band management. Hosts are
//! created by inventory tooling or an administrator; the enrollment
//! controllers only mutate the spec fields and annotations listed below and
//! never delete a host.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Label on a BareMetalHost naming the DiscoveryEnv whose image it boots.
pub const HOST_DISCOVERY_ENV_LABEL: &str = "discoveryenvs.enrollops.io";

/// Annotation disabling hardware inspection by the node agent (value "disabled").
pub const HOST_INSPECT_ANNOTATION: &str = "inspect.enrollops.io";

/// Value written to [`HOST_INSPECT_ANNOTATION`] once a discovery image is assigned.
pub const HOST_INSPECT_DISABLED: &str = "disabled";

/// Annotation carrying the JSON-serialized [`HardwareDetails`] record.
pub const HOST_HARDWARE_DETAILS_ANNOTATION: &str = "inspect.enrollops.io/hardwaredetails";

/// Annotation telling the node agent to relinquish control of the host (value "true").
pub const HOST_DETACHED_ANNOTATION: &str = "baremetalhost.enrollops.io/detached";

/// Value written to [`HOST_DETACHED_ANNOTATION`].
pub const HOST_DETACHED_TRUE: &str = "true";

/// Annotation with the installation role requested for the matched agent.
pub const HOST_ROLE_ANNOTATION: &str = "host.enrollops.io/role";

/// Annotation with the hostname requested for the matched agent.
pub const HOST_HOSTNAME_ANNOTATION: &str = "host.enrollops.io/hostname";

/// Annotation with the machine-config-pool requested for the matched agent.
pub const HOST_MACHINE_CONFIG_POOL_ANNOTATION: &str = "host.enrollops.io/machine-config-pool";

/// Annotation with extra installer arguments, encoded as a JSON string array.
pub const HOST_INSTALLER_ARGS_ANNOTATION: &str = "host.enrollops.io/installer-args";

/// Annotation with ignition config overrides for the matched agent.
pub const HOST_IGNITION_OVERRIDES_ANNOTATION: &str = "host.enrollops.io/ignition-config-overrides";

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[kube(
    group = "enrollops.io",
    version = "v1alpha1",
    kind = "BareMetalHost",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct BareMetalHostSpec {
    /// MAC address of the NIC the host boots from; used to correlate the
    /// host with the discovery agent reporting that interface.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub boot_mac_address: String,

    /// Boot image the node agent serves to the host. Absent until a
    /// discovery image is assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<HostImage>,

    /// Criteria for selecting the installation disk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_device_hints: Option<RootDeviceHints>,

    /// Whether the host should be powered on
    #[serde(default)]
    pub online: bool,

    /// Disk cleaning behaviour between provisionings
    #[serde(default)]
    pub automated_cleaning_mode: CleaningMode,

    /// Out-of-band management endpoint and credential secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bmc: Option<BmcDetails>,
}

/// Boot image reference
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HostImage {
    /// Image download URL
    pub url: String,

    /// Image checksum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,

    /// Checksum algorithm (md5, sha256, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum_type: Option<String>,
}

/// Disk-selection hints. Every populated field must match the candidate
/// disk for the hint set to be satisfied; `min_size_gigabytes` is a lower
/// bound, all other fields compare for exact equality.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RootDeviceHints {
    /// Device path, e.g. "/dev/sda"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,

    /// Device model string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Device vendor string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,

    /// Device serial number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,

    /// Device WWN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wwn: Option<String>,

    /// Minimum device size in gigabytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size_gigabytes: Option<i64>,

    /// Whether the device must be rotational (HDD) or not (SSD/NVMe)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotational: Option<bool>,
}

/// Automated cleaning mode for the node agent
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CleaningMode {
    /// Clean disk metadata between provisionings
    #[default]
    Metadata,

    /// Cleaning disabled
    Disabled,
}

/// Out-of-band management access
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BmcDetails {
    /// Management endpoint address
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address: String,

    /// Name of the secret holding management credentials
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub credentials_name: String,
}

/// Hardware record in the host-management schema, stored JSON-serialized in
/// the [`HOST_HARDWARE_DETAILS_ANNOTATION`] annotation. Produced by
/// translating an agent's reported inventory.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HardwareDetails {
    /// Physical RAM in mebibytes
    pub ram_mebibytes: i64,

    /// Network interfaces
    #[serde(default)]
    pub nic: Vec<HardwareNic>,

    /// Storage devices
    #[serde(default)]
    pub storage: Vec<HardwareStorage>,

    /// CPU description
    #[serde(default)]
    pub cpu: HardwareCpu,
}

/// One NIC entry in [`HardwareDetails`]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HardwareNic {
    /// Interface name, e.g. "eth0"
    pub name: String,

    /// Interface MAC address
    pub mac: String,

    /// Assigned IP addresses (v4 and v6)
    #[serde(default)]
    pub ip_addresses: Vec<String>,
}

/// One storage entry in [`HardwareDetails`]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HardwareStorage {
    /// Stable device identifier
    pub id: String,

    /// Device path
    pub path: String,

    /// Device size in bytes
    pub size_bytes: i64,

    /// Drive type string, e.g. "SSD" or "HDD"
    pub drive_type: String,

    /// Whether the device is bootable
    pub bootable: bool,

    /// Whether the device is rotational
    pub rotational: bool,
}

/// CPU description in [`HardwareDetails`]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HardwareCpu {
    /// CPU architecture, e.g. "x86_64"
    pub arch: String,

    /// CPU model name
    pub model: String,
}
