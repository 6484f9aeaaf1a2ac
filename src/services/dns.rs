use crate::config::Config;
use crate::services::Resolver;
use log::trace;
use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DnsError {
    #[error("No {record} record for {hostname}")]
    NoAnswer { hostname: String, record: RecordType },
    #[error("IO Error {0:?}")]
    Io(#[from] std::io::Error),
    #[error("Dig failed")]
    DigFailed,
    #[error("Failed to parse network address {0:?}")]
    AddrParse(#[from] std::net::AddrParseError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    A,
    Aaaa,
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::Aaaa => f.write_str("AAAA"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DigResolver {
    binary: PathBuf,
    server: Option<String>,
}

impl Resolver for DigResolver {
    fn resolve(&self, hostname: &str, record: RecordType) -> Result<Vec<IpAddr>, DnsError> {
        let stdout = self.dig(hostname, record)?;
        let addrs = parse_short(&stdout)?;
        if addrs.is_empty() {
            return Err(DnsError::NoAnswer {
                hostname: hostname.to_string(),
                record,
            });
        }

        Ok(addrs)
    }
}

impl DigResolver {
    pub fn new(config: &Config) -> Self {
        Self {
            binary: config
                .dns
                .dig_binary
                .clone()
                .unwrap_or_else(|| PathBuf::from("dig")),
            server: config.dns.server.clone(),
        }
    }

    fn dig(&self, hostname: &str, record: RecordType) -> Result<String, DnsError> {
        let mut command = Command::new(&self.binary);
        if let Some(server) = &self.server {
            command.arg(format!("@{}", server));
        }
        command
            .args(&["+short", "+search", hostname])
            .arg(record.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        trace!("Dig: {} {} via {:?}", hostname, record, &self.server);
        let output = command.spawn()?.wait_with_output()?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        trace!("Dig stdout: {:?}", stdout);
        trace!("Dig stderr: {:?}", String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(DnsError::DigFailed);
        }

        Ok(stdout)
    }
}

/// Parse `dig +short` output. CNAME targets end in a dot and are skipped.
fn parse_short(stdout: &str) -> Result<Vec<IpAddr>, DnsError> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.ends_with('.') && !line.starts_with(';'))
        .map(|line| IpAddr::from_str(line).map_err(DnsError::from))
        .collect()
}
