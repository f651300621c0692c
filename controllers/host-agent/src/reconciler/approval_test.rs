//! Unit tests for agent selection, approval and spec sync

use crate::reconciler::approval::*;
use crate::test_utils::{create_test_agent, create_test_host, with_test_inventory};
use crds::{
    RootDeviceHints, AGENT_HOST_LABEL, HOST_HOSTNAME_ANNOTATION,
    HOST_IGNITION_OVERRIDES_ANNOTATION, HOST_INSTALLER_ARGS_ANNOTATION,
    HOST_MACHINE_CONFIG_POOL_ANNOTATION, HOST_ROLE_ANNOTATION,
};
use std::collections::BTreeMap;

#[test]
fn test_select_agent_empty() {
    assert!(select_agent(vec![]).is_none());
}

#[test]
fn test_select_agent_single() {
    let agent = create_test_agent("agent-1", "52:54:00:aa:bb:cc", 1000);
    let selection = select_agent(vec![&agent]).unwrap();
    assert_eq!(selection.selected.metadata.name.as_deref(), Some("agent-1"));
    assert!(selection.stale.is_empty());
}

#[test]
fn test_select_agent_newest_wins() {
    // A rebooted host produces a fresh agent; the older record is stale
    let old = create_test_agent("agent-old", "52:54:00:aa:bb:cc", 1000);
    let new = create_test_agent("agent-new", "52:54:00:aa:bb:cc", 2000);
    let selection = select_agent(vec![&old, &new]).unwrap();
    assert_eq!(
        selection.selected.metadata.name.as_deref(),
        Some("agent-new")
    );
    assert_eq!(selection.stale.len(), 1);
    assert_eq!(
        selection.stale[0].metadata.name.as_deref(),
        Some("agent-old")
    );
}

#[test]
fn test_select_agent_missing_timestamp_loses() {
    let mut undated = create_test_agent("agent-undated", "52:54:00:aa:bb:cc", 0);
    undated.metadata.creation_timestamp = None;
    let dated = create_test_agent("agent-dated", "52:54:00:aa:bb:cc", 1000);
    let selection = select_agent(vec![&undated, &dated]).unwrap();
    assert_eq!(
        selection.selected.metadata.name.as_deref(),
        Some("agent-dated")
    );
}

#[test]
fn test_sync_agent_spec_approves_and_labels() {
    let host = create_test_host("host-1", "52:54:00:aa:bb:cc");
    let mut agent = create_test_agent("agent-1", "52:54:00:aa:bb:cc", 1000);

    assert!(sync_agent_spec(&host, &mut agent));
    assert!(agent.spec.approved);
    assert_eq!(
        agent
            .metadata
            .labels
            .as_ref()
            .and_then(|l| l.get(AGENT_HOST_LABEL))
            .map(String::as_str),
        Some("host-1")
    );
}

#[test]
fn test_sync_agent_spec_copies_annotations() {
    let mut host = create_test_host("host-1", "52:54:00:aa:bb:cc");
    host.metadata.annotations = Some(BTreeMap::from([
        (HOST_ROLE_ANNOTATION.to_string(), "master".to_string()),
        (HOST_HOSTNAME_ANNOTATION.to_string(), "node-0".to_string()),
        (
            HOST_MACHINE_CONFIG_POOL_ANNOTATION.to_string(),
            "infra".to_string(),
        ),
        (
            HOST_INSTALLER_ARGS_ANNOTATION.to_string(),
            r#"["--append-karg","console=ttyS0"]"#.to_string(),
        ),
        (
            HOST_IGNITION_OVERRIDES_ANNOTATION.to_string(),
            r#"{"ignition":{"version":"3.1.0"}}"#.to_string(),
        ),
    ]));
    let mut agent = create_test_agent("agent-1", "52:54:00:aa:bb:cc", 1000);

    assert!(sync_agent_spec(&host, &mut agent));
    assert_eq!(agent.spec.role, "master");
    assert_eq!(agent.spec.hostname, "node-0");
    assert_eq!(agent.spec.machine_config_pool, "infra");
    assert_eq!(
        agent.spec.installer_args,
        r#"["--append-karg","console=ttyS0"]"#
    );
    assert_eq!(
        agent.spec.ignition_config_overrides,
        r#"{"ignition":{"version":"3.1.0"}}"#
    );
}

#[test]
fn test_sync_agent_spec_second_run_clean() {
    let mut host = create_test_host("host-1", "52:54:00:aa:bb:cc");
    host.metadata.annotations = Some(BTreeMap::from([(
        HOST_ROLE_ANNOTATION.to_string(),
        "worker".to_string(),
    )]));
    let mut agent = create_test_agent("agent-1", "52:54:00:aa:bb:cc", 1000);

    assert!(sync_agent_spec(&host, &mut agent));
    // Re-running against the synced agent must not report a change
    assert!(!sync_agent_spec(&host, &mut agent));
}

#[test]
fn test_sync_agent_spec_rejects_malformed_installer_args() {
    let mut host = create_test_host("host-1", "52:54:00:aa:bb:cc");
    host.metadata.annotations = Some(BTreeMap::from([(
        HOST_INSTALLER_ARGS_ANNOTATION.to_string(),
        "not json".to_string(),
    )]));
    let mut agent = create_test_agent("agent-1", "52:54:00:aa:bb:cc", 1000);

    sync_agent_spec(&host, &mut agent);
    assert!(agent.spec.installer_args.is_empty());
}

#[test]
fn test_installation_disk_id_no_hints() {
    let host = create_test_host("host-1", "52:54:00:aa:bb:cc");
    let agent = with_test_inventory(create_test_agent("agent-1", "52:54:00:aa:bb:cc", 1000));
    assert_eq!(installation_disk_id(&host, &agent), "");
}

#[test]
fn test_installation_disk_id_by_device_name() {
    let mut host = create_test_host("host-1", "52:54:00:aa:bb:cc");
    host.spec.root_device_hints = Some(RootDeviceHints {
        device_name: Some("/dev/sda".to_string()),
        ..Default::default()
    });
    let agent = with_test_inventory(create_test_agent("agent-1", "52:54:00:aa:bb:cc", 1000));
    assert_eq!(installation_disk_id(&host, &agent), "1");
}

#[test]
fn test_installation_disk_id_no_matching_disk() {
    let mut host = create_test_host("host-1", "52:54:00:aa:bb:cc");
    host.spec.root_device_hints = Some(RootDeviceHints {
        device_name: Some("/dev/sdc".to_string()),
        ..Default::default()
    });
    let agent = with_test_inventory(create_test_agent("agent-1", "52:54:00:aa:bb:cc", 1000));
    assert_eq!(installation_disk_id(&host, &agent), "");
}

#[test]
fn test_installation_disk_id_rotational_hint() {
    let mut host = create_test_host("host-1", "52:54:00:aa:bb:cc");
    host.spec.root_device_hints = Some(RootDeviceHints {
        rotational: Some(true),
        ..Default::default()
    });
    let agent = with_test_inventory(create_test_agent("agent-1", "52:54:00:aa:bb:cc", 1000));
    // /dev/sda is an SSD; the HDD at /dev/sdb is the first rotational disk
    assert_eq!(installation_disk_id(&host, &agent), "2");
}

#[test]
fn test_installation_disk_id_min_size() {
    let mut host = create_test_host("host-1", "52:54:00:aa:bb:cc");
    host.spec.root_device_hints = Some(RootDeviceHints {
        min_size_gigabytes: Some(1024),
        ..Default::default()
    });
    let agent = with_test_inventory(create_test_agent("agent-1", "52:54:00:aa:bb:cc", 1000));
    // Only the 2 TiB disk satisfies the lower bound
    assert_eq!(installation_disk_id(&host, &agent), "2");
}

#[test]
fn test_installation_disk_id_all_hints_must_match() {
    let mut host = create_test_host("host-1", "52:54:00:aa:bb:cc");
    host.spec.root_device_hints = Some(RootDeviceHints {
        device_name: Some("/dev/sda".to_string()),
        rotational: Some(true),
        ..Default::default()
    });
    let agent = with_test_inventory(create_test_agent("agent-1", "52:54:00:aa:bb:cc", 1000));
    // /dev/sda matches the name but is not rotational
    assert_eq!(installation_disk_id(&host, &agent), "");
}
