//! Unit tests for host/agent correlation

use crate::reconciler::matching::*;
use crate::test_utils::{create_test_agent, create_test_host};
use crds::HOST_DISCOVERY_ENV_LABEL;
use std::collections::BTreeMap;

#[test]
fn test_mac_eq_ignores_case() {
    assert!(mac_eq("52:54:00:AA:BB:CC", "52:54:00:aa:bb:cc"));
}

#[test]
fn test_mac_eq_ignores_separator_style() {
    assert!(mac_eq("52-54-00-aa-bb-cc", "52:54:00:aa:bb:cc"));
    assert!(mac_eq("52-54-00-AA-BB-CC", "52:54:00:aa:bb:cc"));
}

#[test]
fn test_mac_eq_different_addresses() {
    assert!(!mac_eq("52:54:00:aa:bb:cc", "52:54:00:aa:bb:cd"));
}

#[test]
fn test_agent_has_mac() {
    let agent = create_test_agent("agent-1", "52:54:00:aa:bb:cc", 1000);
    assert!(agent_has_mac(&agent, "52:54:00:AA:BB:CC"));
    assert!(!agent_has_mac(&agent, "52:54:00:00:00:00"));
}

#[test]
fn test_agent_has_mac_empty_matches_nothing() {
    // A host without a configured boot MAC must never match an agent,
    // even one that reports an interface with an empty MAC
    let agent = create_test_agent("agent-1", "", 1000);
    assert!(!agent_has_mac(&agent, ""));
}

#[test]
fn test_agent_has_mac_no_inventory() {
    let mut agent = create_test_agent("agent-1", "52:54:00:aa:bb:cc", 1000);
    agent.status = None;
    assert!(!agent_has_mac(&agent, "52:54:00:aa:bb:cc"));
}

#[test]
fn test_find_agents_by_mac() {
    let host = create_test_host("host-1", "52:54:00:aa:bb:cc");
    let agents = vec![
        create_test_agent("agent-1", "52:54:00:aa:bb:cc", 1000),
        create_test_agent("agent-2", "52:54:00:00:00:01", 1000),
        create_test_agent("agent-3", "52-54-00-AA-BB-CC", 2000),
    ];
    let matched = find_agents_by_mac(&host, &agents);
    let names: Vec<_> = matched
        .iter()
        .map(|a| a.metadata.name.as_deref().unwrap())
        .collect();
    assert_eq!(names, vec!["agent-1", "agent-3"]);
}

#[test]
fn test_find_host_by_agent() {
    let hosts = vec![
        create_test_host("host-1", "52:54:00:00:00:01"),
        create_test_host("host-2", "52:54:00:aa:bb:cc"),
    ];
    let agent = create_test_agent("agent-1", "52:54:00:AA:BB:CC", 1000);
    let found = find_host_by_agent(&agent, &hosts);
    assert_eq!(
        found.and_then(|h| h.metadata.name.as_deref()),
        Some("host-2")
    );
}

#[test]
fn test_find_host_by_agent_no_match() {
    let hosts = vec![create_test_host("host-1", "52:54:00:00:00:01")];
    let agent = create_test_agent("agent-1", "52:54:00:aa:bb:cc", 1000);
    assert!(find_host_by_agent(&agent, &hosts).is_none());
}

#[test]
fn test_find_hosts_by_discovery_env() {
    let mut labeled = create_test_host("host-1", "52:54:00:00:00:01");
    labeled.metadata.labels = Some(BTreeMap::from([(
        HOST_DISCOVERY_ENV_LABEL.to_string(),
        "env-a".to_string(),
    )]));
    let unlabeled = create_test_host("host-2", "52:54:00:00:00:02");
    let mut other_env = create_test_host("host-3", "52:54:00:00:00:03");
    other_env.metadata.labels = Some(BTreeMap::from([(
        HOST_DISCOVERY_ENV_LABEL.to_string(),
        "env-b".to_string(),
    )]));

    let hosts = vec![labeled, unlabeled, other_env];
    let matched = find_hosts_by_discovery_env("env-a", &hosts);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].metadata.name.as_deref(), Some("host-1"));
}

#[test]
fn test_discovery_env_name_absent() {
    let host = create_test_host("host-1", "52:54:00:00:00:01");
    assert_eq!(discovery_env_name(&host), None);
}
