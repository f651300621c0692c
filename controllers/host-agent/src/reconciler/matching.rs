//! Host/agent correlation predicates.
//!
//! A host and an agent are independently-created records; the only shared
//! fact between them is the host's configured boot MAC showing up in the
//! agent's reported interfaces. Matching is namespace-scoped and works in
//! both directions: host -> candidate agents and agent -> owning host.
//! Hosts are tied to a DiscoveryEnv through a plain label.

use crds::{Agent, BareMetalHost, HOST_DISCOVERY_ENV_LABEL};

/// Normalizes a MAC address for comparison: separators stripped, lowercase.
/// Hyphen and colon forms of the same address compare equal.
fn normalize_mac(mac: &str) -> String {
    mac.chars()
        .filter(|c| *c != ':' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Whether two MAC addresses are equal regardless of case or separator style.
pub fn mac_eq(a: &str, b: &str) -> bool {
    normalize_mac(a) == normalize_mac(b)
}

/// Whether any interface in the agent's reported inventory carries the
/// given MAC. An empty MAC matches nothing.
pub fn agent_has_mac(agent: &Agent, mac: &str) -> bool {
    if mac.is_empty() {
        return false;
    }
    agent
        .status
        .as_ref()
        .and_then(|status| status.inventory.as_ref())
        .is_some_and(|inventory| {
            inventory
                .interfaces
                .iter()
                .any(|iface| mac_eq(&iface.mac_address, mac))
        })
}

/// Returns the agents whose reported interfaces contain the host's boot
/// MAC. Candidates keep their input order; tie-breaking is the caller's
/// concern.
pub fn find_agents_by_mac<'a>(host: &BareMetalHost, agents: &'a [Agent]) -> Vec<&'a Agent> {
    agents
        .iter()
        .filter(|agent| agent_has_mac(agent, &host.spec.boot_mac_address))
        .collect()
}

/// Reverse direction: finds the host whose boot MAC appears in the agent's
/// reported interfaces.
pub fn find_host_by_agent<'a>(agent: &Agent, hosts: &'a [BareMetalHost]) -> Option<&'a BareMetalHost> {
    hosts
        .iter()
        .find(|host| agent_has_mac(agent, &host.spec.boot_mac_address))
}

/// Hosts labeled as booting from the named DiscoveryEnv.
pub fn find_hosts_by_discovery_env<'a>(
    env_name: &str,
    hosts: &'a [BareMetalHost],
) -> Vec<&'a BareMetalHost> {
    hosts
        .iter()
        .filter(|host| discovery_env_name(host) == Some(env_name))
        .collect()
}

/// The DiscoveryEnv name a host is labeled with, if any.
pub fn discovery_env_name(host: &BareMetalHost) -> Option<&str> {
    host.metadata
        .labels
        .as_ref()
        .and_then(|labels| labels.get(HOST_DISCOVERY_ENV_LABEL))
        .map(String::as_str)
}
