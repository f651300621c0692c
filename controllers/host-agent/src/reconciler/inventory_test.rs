//! Unit tests for inventory translation

use crate::reconciler::inventory::*;
use crate::test_utils::create_test_inventory;

#[test]
fn test_hardware_details_ram_conversion() {
    let details = hardware_details(&create_test_inventory());
    // 32 GiB of physical bytes is 32768 MiB
    assert_eq!(details.ram_mebibytes, 32 * 1024);
}

#[test]
fn test_hardware_details_ram_truncates() {
    let mut inventory = create_test_inventory();
    inventory.memory.physical_bytes = 1024 * 1024 + 1;
    let details = hardware_details(&inventory);
    assert_eq!(details.ram_mebibytes, 1);
}

#[test]
fn test_hardware_details_nics_mirror_interfaces() {
    let inventory = create_test_inventory();
    let details = hardware_details(&inventory);

    assert_eq!(details.nic.len(), inventory.interfaces.len());
    assert_eq!(details.nic[0].name, "eth0");
    assert_eq!(details.nic[0].mac, "52:54:00:aa:bb:cc");
    // v4 then v6, merged into one list
    assert_eq!(
        details.nic[0].ip_addresses,
        vec!["192.168.10.5/24".to_string(), "fe80::1/64".to_string()]
    );
}

#[test]
fn test_hardware_details_storage_mirrors_disks() {
    let inventory = create_test_inventory();
    let details = hardware_details(&inventory);

    assert_eq!(details.storage.len(), inventory.disks.len());
    assert_eq!(details.storage[0].id, "1");
    assert_eq!(details.storage[0].path, "/dev/sda");
    assert!(!details.storage[0].rotational);
    assert!(details.storage[1].rotational);
}

#[test]
fn test_hardware_details_rotational_case_insensitive() {
    let mut inventory = create_test_inventory();
    inventory.disks[0].drive_type = "hdd".to_string();
    let details = hardware_details(&inventory);
    assert!(details.storage[0].rotational);
}

#[test]
fn test_hardware_details_cpu() {
    let details = hardware_details(&create_test_inventory());
    assert_eq!(details.cpu.arch, "x86_64");
    assert_eq!(details.cpu.model, "Intel Xeon");
}

#[test]
fn test_hardware_details_empty_inventory() {
    let details = hardware_details(&Default::default());
    assert_eq!(details.ram_mebibytes, 0);
    assert!(details.nic.is_empty());
    assert!(details.storage.is_empty());
}
