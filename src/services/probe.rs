use crate::services::HostProbe;
use log::trace;
use std::net::ToSocketAddrs;

#[derive(Debug, Clone, Default)]
pub struct ResolverProbe;

impl HostProbe for ResolverProbe {
    fn exists(&self, fqdn: &str) -> bool {
        let exists = match (fqdn, 0).to_socket_addrs() {
            Ok(mut addrs) => addrs.next().is_some(),
            Err(e) => {
                trace!("Lookup of {} failed: {}", fqdn, e);
                false
            }
        };

        trace!("Host {} exists: {}", fqdn, exists);
        exists
    }
}
