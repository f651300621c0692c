//! Test utilities for unit testing the reconciler
//!
//! This module provides helpers for creating test data and setting up test
//! scenarios.

use chrono::{TimeZone, Utc};
use crds::*;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

/// Helper to create a test BareMetalHost with a boot MAC
pub fn create_test_host(name: &str, boot_mac: &str) -> BareMetalHost {
    let mut host = BareMetalHost::new(
        name,
        BareMetalHostSpec {
            boot_mac_address: boot_mac.to_string(),
            ..Default::default()
        },
    );
    host.metadata.namespace = Some("test-ns".to_string());
    host
}

/// Helper to create a test Agent reporting a single interface with the
/// given MAC, created at the given unix timestamp
pub fn create_test_agent(name: &str, mac: &str, created_secs: i64) -> Agent {
    let mut agent = Agent::new(name, AgentSpec::default());
    agent.metadata.namespace = Some("test-ns".to_string());
    agent.metadata.creation_timestamp = Utc
        .timestamp_opt(created_secs, 0)
        .single()
        .map(Time);
    agent.status = Some(AgentStatus {
        inventory: Some(AgentInventory {
            interfaces: vec![AgentInterface {
                name: "eth0".to_string(),
                mac_address: mac.to_string(),
                ipv4_addresses: vec!["192.168.10.5/24".to_string()],
                ..Default::default()
            }],
            ..Default::default()
        }),
        ..Default::default()
    });
    agent
}

/// Helper inventory with two disks: "/dev/sda" (id "1", SSD) and
/// "/dev/sdb" (id "2", HDD)
pub fn create_test_inventory() -> AgentInventory {
    AgentInventory {
        memory: AgentMemory {
            physical_bytes: 32 * 1024 * 1024 * 1024,
            usable_bytes: 30 * 1024 * 1024 * 1024,
        },
        cpu: AgentCpu {
            count: 8,
            architecture: "x86_64".to_string(),
            model_name: "Intel Xeon".to_string(),
        },
        interfaces: vec![AgentInterface {
            name: "eth0".to_string(),
            mac_address: "52:54:00:aa:bb:cc".to_string(),
            ipv4_addresses: vec!["192.168.10.5/24".to_string()],
            ipv6_addresses: vec!["fe80::1/64".to_string()],
            ..Default::default()
        }],
        disks: vec![
            AgentDisk {
                id: "1".to_string(),
                path: "/dev/sda".to_string(),
                drive_type: "SSD".to_string(),
                size_bytes: 512 * 1024 * 1024 * 1024,
                bootable: true,
                vendor: "ATA".to_string(),
                model: "Samsung 870".to_string(),
                serial: "S1234".to_string(),
                wwn: "0x5000000000000001".to_string(),
                eligible: true,
            },
            AgentDisk {
                id: "2".to_string(),
                path: "/dev/sdb".to_string(),
                drive_type: "HDD".to_string(),
                size_bytes: 2048 * 1024 * 1024 * 1024,
                bootable: false,
                vendor: "Seagate".to_string(),
                model: "Barracuda".to_string(),
                serial: "Z9876".to_string(),
                wwn: "0x5000000000000002".to_string(),
                eligible: true,
            },
        ],
        ..Default::default()
    }
}

/// Attaches the helper inventory to an agent
pub fn with_test_inventory(mut agent: Agent) -> Agent {
    let status = agent.status.get_or_insert_with(Default::default);
    status.inventory = Some(create_test_inventory());
    agent
}

/// Sets the install condition on an agent to the given reason
pub fn with_install_condition(mut agent: Agent, reason: &str) -> Agent {
    let status = agent.status.get_or_insert_with(Default::default);
    status.conditions = vec![AgentCondition {
        condition_type: INSTALLED_CONDITION.to_string(),
        status: "True".to_string(),
        reason: reason.to_string(),
        message: String::new(),
    }];
    agent
}
