//! Translation of agent-reported inventory into the host-management
//! hardware-details schema.
//!
//! The translation is a pure, total function: missing optional fields map
//! to zero values and it never fails. The result is serialized verbatim
//! into the hardware-details annotation on the matched host.

use crds::{AgentInventory, HardwareCpu, HardwareDetails, HardwareNic, HardwareStorage};

/// Bytes per mebibyte, used for the RAM conversion.
const MIB: i64 = 1024 * 1024;

/// Translates an agent inventory report into a [`HardwareDetails`] record.
///
/// NIC and storage entries mirror the input one-to-one; RAM is physical
/// bytes truncated to mebibytes; a disk is rotational when its drive type
/// reports "HDD".
pub fn hardware_details(inventory: &AgentInventory) -> HardwareDetails {
    let nic = inventory
        .interfaces
        .iter()
        .map(|iface| {
            let mut ip_addresses =
                Vec::with_capacity(iface.ipv4_addresses.len() + iface.ipv6_addresses.len());
            ip_addresses.extend(iface.ipv4_addresses.iter().cloned());
            ip_addresses.extend(iface.ipv6_addresses.iter().cloned());
            HardwareNic {
                name: iface.name.clone(),
                mac: iface.mac_address.clone(),
                ip_addresses,
            }
        })
        .collect();

    let storage = inventory
        .disks
        .iter()
        .map(|disk| HardwareStorage {
            id: disk.id.clone(),
            path: disk.path.clone(),
            size_bytes: disk.size_bytes,
            drive_type: disk.drive_type.clone(),
            bootable: disk.bootable,
            rotational: disk.drive_type.eq_ignore_ascii_case("HDD"),
        })
        .collect();

    HardwareDetails {
        ram_mebibytes: inventory.memory.physical_bytes / MIB,
        nic,
        storage,
        cpu: HardwareCpu {
            arch: inventory.cpu.architecture.clone(),
            model: inventory.cpu.model_name.clone(),
        },
    }
}
