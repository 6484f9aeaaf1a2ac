use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub dns: DnsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GlobalConfig {
    /// Domain appended when probing for `dev-` counterparts
    pub domain: String,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_declarations")]
    pub declarations: PathBuf,
    #[serde(default = "default_servers_title")]
    pub servers_title: String,
    #[serde(default = "default_upgrade_title")]
    pub upgrade_title: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DirectoryConfig {
    pub ldapsearch_binary: Option<PathBuf>,
    pub uri: String,
    pub base: String,
    #[serde(default = "default_desktop_filter")]
    pub desktop_filter: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct DnsConfig {
    pub dig_binary: Option<PathBuf>,
    pub server: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CacheConfig {
    pub refresh_interval: u64,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            domain: "ocf.berkeley.edu".to_string(),
            bind: default_bind(),
            declarations: default_declarations(),
            servers_title: default_servers_title(),
            upgrade_title: default_upgrade_title(),
        }
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            ldapsearch_binary: None,
            uri: "ldaps://ldap.ocf.berkeley.edu".to_string(),
            base: "ou=Hosts,dc=OCF,dc=Berkeley,dc=EDU".to_string(),
            desktop_filter: default_desktop_filter(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            refresh_interval: 120,
        }
    }
}

fn default_bind() -> String {
    "[::]:4040".to_string()
}

fn default_declarations() -> PathBuf {
    PathBuf::from("/etc/hostdoc/hosts.yaml")
}

fn default_servers_title() -> String {
    "Servers".to_string()
}

fn default_upgrade_title() -> String {
    "Debian Stretch upgrade".to_string()
}

fn default_desktop_filter() -> String {
    "(type=desktop)".to_string()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO Error {0:?}")]
    Io(#[from] std::io::Error),
    #[error("Error serializing to TOML {0:?}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Error deserializing from TOML {0:?}")]
    TomlDe(#[from] toml::de::Error),
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("Reading configuration from file");
        if !path.exists() {
            trace!(
                "Configuration file does not yet exist, writing default to {:?}",
                path
            );
            return Self::create_default(path);
        }

        trace!("Reading configuration from {:?}", path);
        let mut f = fs::File::open(path)?;
        let mut buf = Vec::new();
        f.read_to_end(&mut buf)?;

        trace!("Deserializing configuration file");
        let this = toml::from_slice(buf.as_slice())?;
        Ok(this)
    }

    fn create_default(path: &Path) -> Result<Self, ConfigError> {
        if let Some(parent) = path.parent() {
            trace!(
                "Configuration path has a parent, creating directories at {:?}",
                parent
            );
            fs::create_dir_all(parent)?;
        }

        trace!("Serializing default configuration");
        let default = Self::default();
        let toml = toml::to_string_pretty(&default)?;

        trace!("Writing default configuration to {:?}", path);
        let mut f = fs::File::create(path)?;
        f.write_all(toml.as_bytes())?;

        warn!(
            "A default configuration was created at {:?}. Review the directory and DNS settings for {}.",
            path,
            env!("CARGO_PKG_NAME")
        );

        Ok(default)
    }

    pub fn refresh_interval(&self) -> time::Duration {
        time::Duration::seconds(i64::try_from(self.cache.refresh_interval).unwrap_or(i64::MAX))
    }
}
