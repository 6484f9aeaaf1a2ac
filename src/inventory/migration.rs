use crate::inventory::host::{Host, HostType};
use crate::inventory::BuildError;
use crate::services::Lookups;
use log::trace;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationStatus {
    NeedsUpgrade = 1,
    Blocked = 2,
    Upgraded = 3,
}

impl MigrationStatus {
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::NeedsUpgrade => "Needs upgrade",
            Self::Blocked => "Blocked",
            Self::Upgraded => "Upgraded",
        }
    }
}

impl Default for MigrationStatus {
    fn default() -> Self {
        Self::NeedsUpgrade
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationEntry {
    pub host: Host,
    pub status: MigrationStatus,
    pub comments: Option<String>,
    pub has_dev: bool,
}

impl MigrationEntry {
    pub fn from_hostname(
        lookups: &Lookups,
        hostname: &str,
        status: MigrationStatus,
        comments: Option<String>,
    ) -> Result<Self, BuildError> {
        let dev = lookups.dev_fqdn(hostname);
        let has_dev = lookups.probe.exists(&dev);
        trace!("{} has dev counterpart {}: {}", hostname, dev, has_dev);

        Ok(Self {
            host: Host::from_directory(lookups, hostname, HostType::default(), Vec::new())?,
            status,
            comments,
            has_dev,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{lookups, FakeDirectory, FakeProbe, FakeResolver};

    #[test]
    fn status_values() {
        assert_eq!(MigrationStatus::default(), MigrationStatus::NeedsUpgrade);
        assert_eq!(MigrationStatus::NeedsUpgrade.value(), 1);
        assert_eq!(MigrationStatus::Blocked.value(), 2);
        assert_eq!(MigrationStatus::Upgraded.value(), 3);
    }

    #[test]
    fn has_dev_follows_probe() {
        let mut probe = FakeProbe::default();
        probe
            .existing
            .insert("dev-dementors.ocf.berkeley.edu".to_string());
        let lookups = lookups(
            FakeDirectory::with_hosts(vec!["dementors", "pestilence"]),
            FakeResolver::default(),
            probe,
        );

        let dementors =
            MigrationEntry::from_hostname(&lookups, "dementors", MigrationStatus::default(), None)
                .unwrap();
        let pestilence =
            MigrationEntry::from_hostname(&lookups, "pestilence", MigrationStatus::default(), None)
                .unwrap();

        assert!(dementors.has_dev);
        assert!(!pestilence.has_dev);
        assert_eq!(dementors.status.value(), 1);
        assert_eq!(dementors.host.hostname, "dementors");
    }

    #[test]
    fn unknown_host_fails() {
        let lookups = lookups(
            FakeDirectory::default(),
            FakeResolver::default(),
            FakeProbe::default(),
        );

        assert!(MigrationEntry::from_hostname(
            &lookups,
            "thunder",
            MigrationStatus::Blocked,
            None
        )
        .is_err());
    }
}
