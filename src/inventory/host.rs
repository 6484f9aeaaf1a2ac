use crate::inventory::BuildError;
use crate::services::dns::{DnsError, RecordType};
use crate::services::Lookups;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Shown instead of an address for hosts without an AAAA record
pub const NO_IPV6: &str = "No IPv6 address";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown host type {0:?}")]
pub struct UnknownHostType(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HostType {
    Hypervisor,
    Vm,
    Server,
    Printer,
    Network,
    Desktop,
}

impl HostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hypervisor => "hypervisor",
            Self::Vm => "vm",
            Self::Server => "server",
            Self::Printer => "printer",
            Self::Network => "network",
            Self::Desktop => "desktop",
        }
    }

    pub fn english(&self) -> &'static str {
        match self {
            Self::Hypervisor => "Hypervisor",
            Self::Vm => "Virtual Machine",
            Self::Server => "Physical Server",
            Self::Printer => "Printer",
            Self::Network => "Networking Gear",
            Self::Desktop => "Desktop",
        }
    }

    pub fn has_munin(&self) -> bool {
        matches!(
            self,
            Self::Hypervisor | Self::Vm | Self::Server | Self::Desktop
        )
    }
}

impl Default for HostType {
    fn default() -> Self {
        Self::Vm
    }
}

impl FromStr for HostType {
    type Err = UnknownHostType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hypervisor" => Ok(Self::Hypervisor),
            "vm" => Ok(Self::Vm),
            "server" => Ok(Self::Server),
            "printer" => Ok(Self::Printer),
            "network" => Ok(Self::Network),
            "desktop" => Ok(Self::Desktop),
            other => Err(UnknownHostType(other.to_string())),
        }
    }
}

impl TryFrom<String> for HostType {
    type Error = UnknownHostType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HostType> for String {
    fn from(host_type: HostType) -> Self {
        host_type.as_str().to_string()
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addresses {
    pub ipv4: String,
    pub ipv6: String,
}

/// One inventory host. Addresses are only present once [Host::resolve] ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub hostname: String,
    pub host_type: HostType,
    pub description: String,
    pub children: Vec<Host>,
    pub addresses: Option<Addresses>,
}

impl Host {
    pub fn from_directory(
        lookups: &Lookups,
        hostname: &str,
        host_type: HostType,
        children: Vec<Host>,
    ) -> Result<Self, BuildError> {
        trace!("Looking up {} in the directory", hostname);
        let mut records = lookups
            .directory
            .query(&format!("(cn={})", hostname))?;

        if records.len() != 1 {
            return Err(BuildError::NotUnique {
                hostname: hostname.to_string(),
                matches: records.len(),
            });
        }

        let description = match records.remove(0).remove("description") {
            None => String::new(),
            Some(mut values) if values.len() == 1 => values.remove(0),
            Some(_) => {
                return Err(BuildError::AmbiguousAttribute {
                    hostname: hostname.to_string(),
                    attribute: "description",
                })
            }
        };

        Ok(Self::literal(hostname, host_type, description, children))
    }

    pub fn literal<S: Into<String>>(
        hostname: &str,
        host_type: HostType,
        description: S,
        children: Vec<Host>,
    ) -> Self {
        Self {
            hostname: hostname.to_string(),
            host_type,
            description: description.into(),
            children,
            addresses: None,
        }
    }

    /// Look up the A and AAAA records. A missing A record is an error.
    pub fn resolve(mut self, lookups: &Lookups) -> Result<Self, BuildError> {
        let ipv4 = resolve_ipv4(lookups, &self.hostname)?;
        let ipv6 = resolve_ipv6(lookups, &self.hostname)?;
        debug!("Resolved {} to {} / {}", self.hostname, ipv4, ipv6);

        self.addresses = Some(Addresses { ipv4, ipv6 });
        Ok(self)
    }

    pub fn ipv4(&self) -> Option<&str> {
        self.addresses.as_ref().map(|a| a.ipv4.as_str())
    }

    pub fn ipv6(&self) -> Option<&str> {
        self.addresses.as_ref().map(|a| a.ipv6.as_str())
    }

    pub fn english_type(&self) -> &'static str {
        self.host_type.english()
    }

    pub fn has_munin(&self) -> bool {
        self.host_type.has_munin()
    }
}

fn resolve_ipv4(lookups: &Lookups, hostname: &str) -> Result<String, DnsError> {
    first_address(lookups, hostname, RecordType::A)
}

fn resolve_ipv6(lookups: &Lookups, hostname: &str) -> Result<String, DnsError> {
    match first_address(lookups, hostname, RecordType::Aaaa) {
        Err(DnsError::NoAnswer { .. }) => Ok(NO_IPV6.to_string()),
        other => other,
    }
}

fn first_address(
    lookups: &Lookups,
    hostname: &str,
    record: RecordType,
) -> Result<String, DnsError> {
    lookups
        .resolver
        .resolve(hostname, record)?
        .into_iter()
        .next()
        .map(|addr| addr.to_string())
        .ok_or_else(|| DnsError::NoAnswer {
            hostname: hostname.to_string(),
            record,
        })
}
