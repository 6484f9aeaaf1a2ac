use crate::inventory::host::HostType;
use crate::inventory::migration::MigrationStatus;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeclarationError {
    #[error("IO error {0:?}")]
    Io(#[from] std::io::Error),
    #[error("Failed to (de)serialize YAML {0:?}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Empty hostname in declarations")]
    EmptyHostname,
    #[error("Host {0} is declared more than once in the inventory")]
    Duplicate(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declarations {
    pub inventory: InventoryDeclaration,
    pub upgrades: Vec<UpgradeDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryDeclaration {
    pub hypervisors: Vec<HypervisorDeclaration>,
    pub devices: Vec<DeviceDeclaration>,
    /// Append the desktops currently listed in the directory
    #[serde(default = "default_true")]
    pub desktops: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypervisorDeclaration {
    pub hostname: String,
    #[serde(default)]
    pub children: Vec<String>,
}

/// A device shown with the metadata given here, without a directory lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDeclaration {
    pub hostname: String,
    #[serde(rename = "type")]
    pub host_type: HostType,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeDeclaration {
    pub hostname: String,
    #[serde(default)]
    pub status: MigrationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Declarations {
    pub fn read(path: &Path) -> Result<Self, DeclarationError> {
        if !path.exists() {
            return Self::create_default(path);
        }

        trace!("Opening declarations file at {:?}", path);
        let f = fs::File::open(path)?;

        trace!("Reading declarations");
        let this: Self = serde_yaml::from_reader(&f)?;
        this.validate()?;
        debug!(
            "Loaded {} hypervisor(s), {} device(s) and {} upgrade entries",
            this.inventory.hypervisors.len(),
            this.inventory.devices.len(),
            this.upgrades.len()
        );
        Ok(this)
    }

    fn create_default(path: &Path) -> Result<Self, DeclarationError> {
        debug!("Creating default declarations at {:?}", path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut f = fs::File::create(path)?;
        let this = Self::default();
        serde_yaml::to_writer(&mut f, &this)?;

        warn!("Wrote the default host declarations to {:?}", path);
        Ok(this)
    }

    fn validate(&self) -> Result<(), DeclarationError> {
        let mut seen = HashSet::new();
        let inventory = self
            .inventory
            .hypervisors
            .iter()
            .flat_map(|hv| std::iter::once(&hv.hostname).chain(hv.children.iter()))
            .chain(self.inventory.devices.iter().map(|d| &d.hostname));

        for hostname in inventory {
            if hostname.trim().is_empty() {
                return Err(DeclarationError::EmptyHostname);
            }
            if !seen.insert(hostname) {
                return Err(DeclarationError::Duplicate(hostname.clone()));
            }
        }

        if self.upgrades.iter().any(|u| u.hostname.trim().is_empty()) {
            return Err(DeclarationError::EmptyHostname);
        }

        Ok(())
    }
}

fn hypervisor(hostname: &str, children: &[&str]) -> HypervisorDeclaration {
    HypervisorDeclaration {
        hostname: hostname.to_string(),
        children: children.iter().map(|c| c.to_string()).collect(),
    }
}

fn device(hostname: &str, host_type: HostType, description: &str) -> DeviceDeclaration {
    DeviceDeclaration {
        hostname: hostname.to_string(),
        host_type,
        description: description.to_string(),
    }
}

fn upgrade(hostname: &str, status: MigrationStatus, comments: Option<&str>) -> UpgradeDeclaration {
    UpgradeDeclaration {
        hostname: hostname.to_string(),
        status,
        comments: comments.map(str::to_string),
    }
}

impl Default for InventoryDeclaration {
    fn default() -> Self {
        Self {
            hypervisors: vec![
                hypervisor("hal", &["maelstrom", "pollution", "zombies"]),
                hypervisor(
                    "jaws",
                    &["death", "reaper", "sandstorm", "supernova", "tsunami", "werewolves"],
                ),
                hypervisor(
                    "pandemic",
                    &[
                        "anthrax",
                        "coma",
                        "dementors",
                        "fallingrocks",
                        "firestorm",
                        "flood",
                        "lightning",
                        "pestilence",
                        "typhoon",
                    ],
                ),
            ],
            devices: vec![
                device(
                    "blackhole",
                    HostType::Network,
                    "Managed Cisco Catalyst 2960S-48TS-L Switch.",
                ),
                device("deforestation", HostType::Printer, ""),
                device("logjam", HostType::Printer, ""),
            ],
            desktops: true,
        }
    }
}

impl Default for Declarations {
    fn default() -> Self {
        use MigrationStatus::{Blocked, NeedsUpgrade, Upgraded};

        const LOGIN: &str = "same time as all login servers";
        const NO_PUPPET: &str = "no puppetlabs packages yet";
        const NO_MESOS: &str = "no mesos packages yet";

        let upgrades = vec![
            upgrade("firestorm", Upgraded, None),
            upgrade("anthrax", NeedsUpgrade, Some("maybe move to marathon instead?")),
            // login servers
            upgrade(
                "death",
                NeedsUpgrade,
                Some("same time as all login servers; need to forward-port suPHP or replace it"),
            ),
            upgrade("tsunami", NeedsUpgrade, Some(LOGIN)),
            upgrade(
                "werewolves",
                NeedsUpgrade,
                Some(
                    "same time as all login servers; \
                     last time we set up an entirely new server and moved vhosts one-by-one",
                ),
            ),
            upgrade("maelstrom", Upgraded, None),
            upgrade("supernova", Upgraded, None),
            upgrade("biohazard", Upgraded, None),
            upgrade("dementors", NeedsUpgrade, None),
            upgrade(
                "flood",
                NeedsUpgrade,
                Some("will be easier to upgrade once the Slack to IRC bridge is moved to Marathon"),
            ),
            upgrade("pestilence", NeedsUpgrade, None),
            upgrade("thunder", Blocked, Some(NO_PUPPET)),
            upgrade("whiteout", Upgraded, None),
            upgrade("reaper", Upgraded, None),
            upgrade("democracy", NeedsUpgrade, None),
            upgrade("zombies", Upgraded, Some("in-place (not well puppeted)")),
            upgrade("lightning", Blocked, Some(NO_PUPPET)),
            upgrade(
                "fallingrocks",
                Upgraded,
                Some("rebuilt, with the old /opt/mirrors drive mounted in-place"),
            ),
            upgrade("tornado", Upgraded, None),
            // mesos servers
            upgrade("whirlwind", Blocked, Some(NO_MESOS)),
            upgrade("pileup", Blocked, Some(NO_MESOS)),
            upgrade("monsoon", Blocked, Some(NO_MESOS)),
            // raspberry pi
            upgrade(
                "overheat",
                Upgraded,
                Some("not puppeted, still needs ocflib and a wrapper around the LED sign"),
            ),
            // physical servers
            upgrade("riptide", Upgraded, Some("it was made this way")),
            upgrade(
                "jaws",
                NeedsUpgrade,
                Some("probably in-place, too hard to move stuff around"),
            ),
            upgrade(
                "pandemic",
                NeedsUpgrade,
                Some("probably in-place, too hard to move stuff around unless installing new drives too"),
            ),
            upgrade(
                "hal",
                NeedsUpgrade,
                Some("changing soon when installing new drives, so it will be upgraded with replacement"),
            ),
        ];

        Self {
            inventory: InventoryDeclaration::default(),
            upgrades,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_survive_the_file() {
        let defaults = Declarations::default();
        let yaml = serde_yaml::to_string(&defaults).unwrap();
        let read: Declarations = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(read, defaults);
        read.validate().unwrap();
    }

    #[test]
    fn upgrade_status_defaults_to_needs_upgrade() {
        let declarations: Declarations = serde_yaml::from_str(
            r#"
inventory:
  hypervisors:
    - hostname: hal
      children: [maelstrom]
  devices: []
upgrades:
  - hostname: dementors
  - hostname: thunder
    status: blocked
    comments: no puppetlabs packages yet
"#,
        )
        .unwrap();

        assert!(declarations.inventory.desktops);
        assert_eq!(declarations.upgrades[0].status, MigrationStatus::NeedsUpgrade);
        assert_eq!(declarations.upgrades[0].comments, None);
        assert_eq!(declarations.upgrades[1].status, MigrationStatus::Blocked);
    }

    #[test]
    fn unknown_device_type_is_rejected() {
        let result = serde_yaml::from_str::<Declarations>(
            r#"
inventory:
  hypervisors: []
  devices:
    - hostname: toast
      type: toaster
upgrades: []
"#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn duplicate_inventory_hosts_are_rejected() {
        let mut declarations = Declarations::default();
        declarations.inventory.hypervisors[0]
            .children
            .push("death".to_string());

        assert!(matches!(
            declarations.validate(),
            Err(DeclarationError::Duplicate(host)) if host == "death"
        ));
    }

    #[test]
    fn default_inventory_order() {
        let inventory = InventoryDeclaration::default();
        let hypervisors = inventory
            .hypervisors
            .iter()
            .map(|hv| hv.hostname.as_str())
            .collect::<Vec<_>>();

        assert_eq!(hypervisors, vec!["hal", "jaws", "pandemic"]);
        assert_eq!(
            inventory.hypervisors[0].children,
            vec!["maelstrom", "pollution", "zombies"]
        );
    }
}
