use crate::inventory::declaration::{InventoryDeclaration, UpgradeDeclaration};
use crate::inventory::host::{Host, HostType};
use crate::inventory::migration::MigrationEntry;
use crate::services::directory::DirectoryError;
use crate::services::dns::DnsError;
use crate::services::Lookups;
use log::{debug, info};
use thiserror::Error;

pub mod declaration;
pub mod host;
pub mod migration;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Directory error {0:?}")]
    Directory(#[from] DirectoryError),
    #[error("Expected one directory entry for {hostname}, found {matches}")]
    NotUnique { hostname: String, matches: usize },
    #[error("Host {hostname} has more than one {attribute}")]
    AmbiguousAttribute {
        hostname: String,
        attribute: &'static str,
    },
    #[error("DNS error {0}")]
    Dns(#[from] DnsError),
}

pub fn build_inventory(
    lookups: &Lookups,
    declaration: &InventoryDeclaration,
) -> Result<Vec<Host>, BuildError> {
    debug!("Building inventory");
    let mut hosts = Vec::new();

    for hypervisor in &declaration.hypervisors {
        let children = hypervisor
            .children
            .iter()
            .map(|child| {
                Host::from_directory(lookups, child, HostType::default(), Vec::new())
                    .and_then(|host| host.resolve(lookups))
            })
            .collect::<Result<Vec<_>, _>>()?;

        hosts.push(
            Host::from_directory(lookups, &hypervisor.hostname, HostType::Hypervisor, children)?
                .resolve(lookups)?,
        );
    }

    for device in &declaration.devices {
        hosts.push(
            Host::literal(
                &device.hostname,
                device.host_type,
                device.description.as_str(),
                Vec::new(),
            )
            .resolve(lookups)?,
        );
    }

    if declaration.desktops {
        for desktop in lookups.desktops.list_desktops()? {
            hosts.push(
                Host::from_directory(lookups, &desktop, HostType::Desktop, Vec::new())?
                    .resolve(lookups)?,
            );
        }
    }

    info!("Built inventory of {} top-level host(s)", hosts.len());
    Ok(hosts)
}

pub fn build_tracklist(
    lookups: &Lookups,
    upgrades: &[UpgradeDeclaration],
) -> Result<Vec<MigrationEntry>, BuildError> {
    debug!("Building upgrade tracklist");
    let entries = upgrades
        .iter()
        .map(|upgrade| {
            MigrationEntry::from_hostname(
                lookups,
                &upgrade.hostname,
                upgrade.status,
                upgrade.comments.clone(),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!("Built upgrade tracklist of {} host(s)", entries.len());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::declaration::{DeviceDeclaration, HypervisorDeclaration};
    use crate::inventory::host::NO_IPV6;
    use crate::inventory::migration::MigrationStatus;
    use crate::services::testing::{lookups, FakeDirectory, FakeProbe, FakeResolver};

    fn small_inventory() -> InventoryDeclaration {
        InventoryDeclaration {
            hypervisors: vec![HypervisorDeclaration {
                hostname: "hal".to_string(),
                children: vec![
                    "maelstrom".to_string(),
                    "pollution".to_string(),
                    "zombies".to_string(),
                ],
            }],
            devices: vec![DeviceDeclaration {
                hostname: "blackhole".to_string(),
                host_type: HostType::Network,
                description: "Managed Cisco Catalyst 2960S-48TS-L Switch.".to_string(),
            }],
            desktops: true,
        }
    }

    #[test]
    fn hypervisor_with_guests() {
        let mut directory =
            FakeDirectory::with_hosts(vec!["hal", "maelstrom", "pollution", "zombies"]);
        directory.desktops = vec!["cyclone".to_string(), "acid".to_string()];
        directory.add("cyclone", None);
        directory.add("acid", Some("Lab desktop"));
        let lookups = lookups(directory, FakeResolver::default(), FakeProbe::default());

        let hosts = build_inventory(&lookups, &small_inventory()).unwrap();

        let hal = &hosts[0];
        assert_eq!(hal.hostname, "hal");
        assert_eq!(hal.host_type, HostType::Hypervisor);
        assert_eq!(hal.description, "");
        assert_eq!(hal.ipv4(), Some("10.0.0.1"));
        assert_eq!(hal.ipv6(), Some(NO_IPV6));
        assert_eq!(
            hal.children
                .iter()
                .map(|c| c.hostname.as_str())
                .collect::<Vec<_>>(),
            vec!["maelstrom", "pollution", "zombies"]
        );
        assert!(hal.children.iter().all(|c| c.host_type == HostType::Vm));
        assert!(hal.children.iter().all(|c| c.addresses.is_some()));

        let order = hosts
            .iter()
            .map(|h| h.hostname.as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["hal", "blackhole", "cyclone", "acid"]);

        assert!(!hosts[1].has_munin());
        assert_eq!(hosts[3].host_type, HostType::Desktop);
        assert_eq!(hosts[3].description, "Lab desktop");
    }

    #[test]
    fn devices_skip_the_directory() {
        let mut inventory = small_inventory();
        inventory.hypervisors.clear();
        inventory.desktops = false;
        let directory = FakeDirectory::default();
        let lookups = lookups(directory, FakeResolver::default(), FakeProbe::default());

        let hosts = build_inventory(&lookups, &inventory).unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].english_type(), "Networking Gear");
        assert_eq!(
            hosts[0].description,
            "Managed Cisco Catalyst 2960S-48TS-L Switch."
        );
    }

    #[test]
    fn one_missing_guest_fails_everything() {
        let directory = FakeDirectory::with_hosts(vec!["hal", "maelstrom", "zombies"]);
        let lookups = lookups(directory, FakeResolver::default(), FakeProbe::default());

        let err = build_inventory(&lookups, &small_inventory()).unwrap_err();
        assert!(matches!(
            err,
            BuildError::NotUnique { ref hostname, matches: 0 } if hostname == "pollution"
        ));
    }

    #[test]
    fn missing_ipv4_fails_everything() {
        let directory =
            FakeDirectory::with_hosts(vec!["hal", "maelstrom", "pollution", "zombies"]);
        let mut resolver = FakeResolver::default();
        resolver.missing_v4.insert("blackhole".to_string());
        let lookups = lookups(directory, resolver, FakeProbe::default());

        assert!(matches!(
            build_inventory(&lookups, &small_inventory()),
            Err(BuildError::Dns(DnsError::NoAnswer { .. }))
        ));
    }

    #[test]
    fn tracklist_keeps_declaration_order() {
        let upgrades = vec![
            UpgradeDeclaration {
                hostname: "firestorm".to_string(),
                status: MigrationStatus::Upgraded,
                comments: None,
            },
            UpgradeDeclaration {
                hostname: "dementors".to_string(),
                status: MigrationStatus::default(),
                comments: None,
            },
            UpgradeDeclaration {
                hostname: "thunder".to_string(),
                status: MigrationStatus::Blocked,
                comments: Some("no puppetlabs packages yet".to_string()),
            },
        ];
        let mut probe = FakeProbe::default();
        probe
            .existing
            .insert("dev-dementors.ocf.berkeley.edu".to_string());
        let lookups = lookups(
            FakeDirectory::with_hosts(vec!["firestorm", "dementors", "thunder"]),
            FakeResolver::default(),
            probe,
        );

        let entries = build_tracklist(&lookups, &upgrades).unwrap();

        let names = entries
            .iter()
            .map(|e| e.host.hostname.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["firestorm", "dementors", "thunder"]);
        assert_eq!(entries[1].status, MigrationStatus::NeedsUpgrade);
        assert!(entries[1].has_dev);
        assert!(!entries[0].has_dev);
        assert_eq!(
            entries[2].comments.as_deref(),
            Some("no puppetlabs packages yet")
        );
    }

    #[test]
    fn tracklist_fails_on_any_missing_host() {
        let upgrades = vec![UpgradeDeclaration {
            hostname: "biohazard".to_string(),
            status: MigrationStatus::Upgraded,
            comments: None,
        }];
        let lookups = lookups(
            FakeDirectory::default(),
            FakeResolver::default(),
            FakeProbe::default(),
        );

        assert!(build_tracklist(&lookups, &upgrades).is_err());
    }

    #[test]
    fn tracklist_needs_no_addresses() {
        let upgrades = vec![UpgradeDeclaration {
            hostname: "overheat".to_string(),
            status: MigrationStatus::Upgraded,
            comments: None,
        }];
        let mut resolver = FakeResolver::default();
        resolver.missing_v4.insert("overheat".to_string());
        let lookups = lookups(
            FakeDirectory::with_hosts(vec!["overheat"]),
            resolver,
            FakeProbe::default(),
        );

        let entries = build_tracklist(&lookups, &upgrades).unwrap();
        assert_eq!(entries[0].host.hostname, "overheat");
        assert_eq!(entries[0].host.addresses, None);
    }
}
