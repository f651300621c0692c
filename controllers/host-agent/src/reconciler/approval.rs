//! Agent selection, approval and spec sync.
//!
//! A host moves from unmatched to matched-unapproved when at least one
//! agent reports its boot MAC, and to matched-approved once the selected
//! agent's spec has been synced from the host's annotations. When several
//! agents match (a host rebooted into a fresh discovery process), the
//! newest one wins and stale duplicates are actively un-approved so they
//! never remain eligible for installation.

use chrono::{DateTime, Utc};
use crds::{
    Agent, AgentDisk, BareMetalHost, RootDeviceHints, AGENT_HOST_LABEL, HOST_HOSTNAME_ANNOTATION,
    HOST_IGNITION_OVERRIDES_ANNOTATION, HOST_INSTALLER_ARGS_ANNOTATION,
    HOST_MACHINE_CONFIG_POOL_ANNOTATION, HOST_ROLE_ANNOTATION,
};
use tracing::warn;

use super::annotations::{get_annotation, set_label};

const GIB: i64 = 1024 * 1024 * 1024;

/// Outcome of the tie-break over matching agents.
#[derive(Debug)]
pub struct AgentSelection<'a> {
    /// The agent this pass will configure and approve
    pub selected: &'a Agent,
    /// Previously matching agents that must not stay approved
    pub stale: Vec<&'a Agent>,
}

fn creation_time(agent: &Agent) -> DateTime<Utc> {
    agent
        .metadata
        .creation_timestamp
        .as_ref()
        .map_or(DateTime::<Utc>::MIN_UTC, |time| time.0)
}

/// Picks the agent with the latest creation timestamp; the rest are stale.
pub fn select_agent(candidates: Vec<&Agent>) -> Option<AgentSelection<'_>> {
    let newest = candidates
        .iter()
        .enumerate()
        .max_by_key(|(_, agent)| creation_time(agent))
        .map(|(index, _)| index)?;
    let selected = candidates[newest];
    let stale = candidates
        .into_iter()
        .enumerate()
        .filter(|(index, _)| *index != newest)
        .map(|(_, agent)| agent)
        .collect();
    Some(AgentSelection { selected, stale })
}

/// Syncs the selected agent's spec from the host: installation
/// configuration copied from annotations, the installation disk resolved
/// from root device hints against current inventory, approval granted and
/// the back-reference label set. Returns whether the agent changed.
///
/// Re-entrant: running this on an already-approved agent only produces
/// changes when the host's annotations or the hint resolution changed.
pub fn sync_agent_spec(host: &BareMetalHost, agent: &mut Agent) -> bool {
    let mut dirty = false;

    if let Some(role) = get_annotation(host, HOST_ROLE_ANNOTATION)
        && agent.spec.role != role
    {
        agent.spec.role = role.to_string();
        dirty = true;
    }
    if let Some(hostname) = get_annotation(host, HOST_HOSTNAME_ANNOTATION)
        && agent.spec.hostname != hostname
    {
        agent.spec.hostname = hostname.to_string();
        dirty = true;
    }
    if let Some(pool) = get_annotation(host, HOST_MACHINE_CONFIG_POOL_ANNOTATION)
        && agent.spec.machine_config_pool != pool
    {
        agent.spec.machine_config_pool = pool.to_string();
        dirty = true;
    }
    if let Some(args) = get_annotation(host, HOST_INSTALLER_ARGS_ANNOTATION) {
        // The annotation must hold a JSON string array. A malformed value is
        // a soft failure for this one field; the rest of the sync proceeds.
        if serde_json::from_str::<Vec<String>>(args).is_ok() {
            if agent.spec.installer_args != args {
                agent.spec.installer_args = args.to_string();
                dirty = true;
            }
        } else {
            warn!(
                "Ignoring malformed installer-args annotation on BareMetalHost {}",
                host.metadata.name.as_deref().unwrap_or_default()
            );
        }
    }
    if let Some(overrides) = get_annotation(host, HOST_IGNITION_OVERRIDES_ANNOTATION)
        && agent.spec.ignition_config_overrides != overrides
    {
        agent.spec.ignition_config_overrides = overrides.to_string();
        dirty = true;
    }

    // Resolved from the agent's current disk list every pass: a disk that
    // vanishes from inventory clears a previously resolved id.
    let disk_id = installation_disk_id(host, agent);
    if agent.spec.installation_disk_id != disk_id {
        agent.spec.installation_disk_id = disk_id;
        dirty = true;
    }

    if !agent.spec.approved {
        agent.spec.approved = true;
        dirty = true;
    }
    if let Some(host_name) = host.metadata.name.as_deref() {
        dirty |= set_label(agent, AGENT_HOST_LABEL, host_name);
    }
    dirty
}

/// Resolves the installation disk id: first disk in the agent's current
/// inventory satisfying every populated hint field, empty string when the
/// host carries no hints or nothing matches.
pub fn installation_disk_id(host: &BareMetalHost, agent: &Agent) -> String {
    let Some(hints) = host.spec.root_device_hints.as_ref() else {
        return String::new();
    };
    agent
        .status
        .as_ref()
        .and_then(|status| status.inventory.as_ref())
        .map(|inventory| inventory.disks.as_slice())
        .unwrap_or_default()
        .iter()
        .find(|disk| disk_matches_hints(disk, hints))
        .map(|disk| disk.id.clone())
        .unwrap_or_default()
}

fn disk_matches_hints(disk: &AgentDisk, hints: &RootDeviceHints) -> bool {
    if let Some(device_name) = hints.device_name.as_deref()
        && disk.path != device_name
    {
        return false;
    }
    if let Some(model) = hints.model.as_deref()
        && disk.model != model
    {
        return false;
    }
    if let Some(vendor) = hints.vendor.as_deref()
        && disk.vendor != vendor
    {
        return false;
    }
    if let Some(serial) = hints.serial_number.as_deref()
        && disk.serial != serial
    {
        return false;
    }
    if let Some(wwn) = hints.wwn.as_deref()
        && disk.wwn != wwn
    {
        return false;
    }
    if let Some(min_size) = hints.min_size_gigabytes
        && disk.size_bytes < min_size * GIB
    {
        return false;
    }
    if let Some(rotational) = hints.rotational
        && disk.drive_type.eq_ignore_ascii_case("HDD") != rotational
    {
        return false;
    }
    true
}
