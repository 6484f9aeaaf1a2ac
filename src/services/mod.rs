use crate::services::directory::DirectoryError;
use crate::services::dns::{DnsError, RecordType};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

pub mod directory;
pub mod dns;
pub mod probe;

/// A single directory entry, attribute name to its values
pub type Record = HashMap<String, Vec<String>>;

pub trait Directory {
    fn query(&self, filter: &str) -> Result<Vec<Record>, DirectoryError>;
}

pub trait DesktopLister {
    fn list_desktops(&self) -> Result<Vec<String>, DirectoryError>;
}

pub trait Resolver {
    /// Resolve `hostname`, returning [DnsError::NoAnswer] when no record of `record` exists
    fn resolve(&self, hostname: &str, record: RecordType) -> Result<Vec<IpAddr>, DnsError>;
}

pub trait HostProbe {
    fn exists(&self, fqdn: &str) -> bool;
}

#[derive(Clone)]
pub struct Lookups {
    pub directory: Arc<dyn Directory + Send + Sync>,
    pub desktops: Arc<dyn DesktopLister + Send + Sync>,
    pub resolver: Arc<dyn Resolver + Send + Sync>,
    pub probe: Arc<dyn HostProbe + Send + Sync>,
    pub domain: String,
}

impl Lookups {
    pub fn dev_fqdn(&self, hostname: &str) -> String {
        format!("dev-{}.{}", hostname, self.domain)
    }
}
