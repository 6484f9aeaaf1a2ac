use crate::config::Config;
use crate::services::{DesktopLister, Directory, Record};
use log::{debug, trace, warn};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("IO Error {0:?}")]
    Io(#[from] std::io::Error),
    #[error("ldapsearch failed")]
    LdapsearchFailed,
    #[error("Invalid base64 value for {0}")]
    Base64(String, #[source] base64::DecodeError),
    #[error("Value of {0} is not UTF-8")]
    Utf8(String, #[source] std::string::FromUtf8Error),
}

#[derive(Debug, Clone)]
pub struct LdapDirectory {
    binary: PathBuf,
    uri: String,
    base: String,
    desktop_filter: String,
}

impl Directory for LdapDirectory {
    fn query(&self, filter: &str) -> Result<Vec<Record>, DirectoryError> {
        let stdout = self.ldapsearch(filter, &[])?;
        let records = parse_ldif(&stdout)?;
        debug!("Directory query {} returned {} record(s)", filter, records.len());
        Ok(records)
    }
}

impl DesktopLister for LdapDirectory {
    fn list_desktops(&self) -> Result<Vec<String>, DirectoryError> {
        let stdout = self.ldapsearch(&self.desktop_filter, &["cn"])?;
        let desktops = parse_ldif(&stdout)?
            .into_iter()
            .filter_map(|mut record| record.remove("cn"))
            .filter_map(|cn| cn.into_iter().next())
            .collect::<Vec<_>>();

        debug!("Found {} desktop(s)", desktops.len());
        Ok(desktops)
    }
}

impl LdapDirectory {
    pub fn new(config: &Config) -> Self {
        Self {
            binary: config
                .directory
                .ldapsearch_binary
                .clone()
                .unwrap_or_else(|| PathBuf::from("ldapsearch")),
            uri: config.directory.uri.clone(),
            base: config.directory.base.clone(),
            desktop_filter: config.directory.desktop_filter.clone(),
        }
    }

    fn ldapsearch(&self, filter: &str, attributes: &[&str]) -> Result<String, DirectoryError> {
        trace!("Ldapsearch: {} under {} at {}", filter, &self.base, &self.uri);
        let output = Command::new(&self.binary)
            .args(&[
                "-x",
                "-LLL",
                "-o",
                "ldif-wrap=no",
                "-H",
                self.uri.as_str(),
                "-b",
                self.base.as_str(),
                filter,
            ])
            .args(attributes)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?
            .wait_with_output()?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        trace!("Ldapsearch stdout: {:?}", stdout);
        trace!(
            "Ldapsearch stderr: {:?}",
            String::from_utf8_lossy(&output.stderr)
        );

        if !output.status.success() {
            return Err(DirectoryError::LdapsearchFailed);
        }

        Ok(stdout)
    }
}

/// Parse LDIF as printed by `ldapsearch -LLL`. A leading space continues the
/// previous line and `attr:: value` is base64.
fn parse_ldif(ldif: &str) -> Result<Vec<Record>, DirectoryError> {
    let mut records = Vec::new();
    let mut current = Record::new();
    let mut last: Option<Line> = None;

    for line in ldif.lines() {
        if let Some(continuation) = line.strip_prefix(' ') {
            if let Some(last) = last.as_mut() {
                last.value.push_str(continuation);
            }
            continue;
        }

        flush_line(&mut current, &mut last)?;

        if line.trim().is_empty() {
            if !current.is_empty() {
                records.push(std::mem::take(&mut current));
            }
            continue;
        }

        if line.starts_with('#') {
            continue;
        }

        match line.split_once(':') {
            Some((attribute, value)) => {
                let (encoded, value) = match value.strip_prefix(':') {
                    Some(value) => (true, value),
                    None => (false, value),
                };
                last = Some(Line {
                    attribute: attribute.to_string(),
                    value: value.trim_start().to_string(),
                    encoded,
                });
            }
            None => warn!("Skipping malformed LDIF line {:?}", line),
        }
    }

    flush_line(&mut current, &mut last)?;
    if !current.is_empty() {
        records.push(current);
    }

    Ok(records)
}

struct Line {
    attribute: String,
    value: String,
    encoded: bool,
}

fn flush_line(current: &mut Record, last: &mut Option<Line>) -> Result<(), DirectoryError> {
    let line = match last.take() {
        Some(line) => line,
        None => return Ok(()),
    };

    let value = if line.encoded {
        let bytes = base64::decode(line.value.trim_end())
            .map_err(|e| DirectoryError::Base64(line.attribute.clone(), e))?;
        String::from_utf8(bytes).map_err(|e| DirectoryError::Utf8(line.attribute.clone(), e))?
    } else {
        line.value
    };

    current.entry(line.attribute).or_default().push(value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_entry() {
        let records = parse_ldif(
            "dn: cn=hal,ou=Hosts,dc=OCF,dc=Berkeley,dc=EDU\n\
             cn: hal\n\
             type: hypervisor\n\
             description: Hypervisor in the server room\n",
        )
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["cn"], vec!["hal"]);
        assert_eq!(
            records[0]["description"],
            vec!["Hypervisor in the server room"]
        );
    }

    #[test]
    fn parses_multiple_entries_and_values() {
        let records = parse_ldif(
            "# search result\n\
             dn: cn=cyclone,ou=Hosts,dc=OCF,dc=Berkeley,dc=EDU\n\
             cn: cyclone\n\
             \n\
             dn: cn=acid,ou=Hosts,dc=OCF,dc=Berkeley,dc=EDU\n\
             cn: acid\n\
             puppetVar: staff_only=false\n\
             puppetVar: owner=lab\n\
             \n",
        )
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["cn"], vec!["cyclone"]);
        assert_eq!(
            records[1]["puppetVar"],
            vec!["staff_only=false", "owner=lab"]
        );
    }

    #[test]
    fn joins_continuation_lines() {
        let records =
            parse_ldif("cn: blackhole\ndescription: Managed Cisco\n  Catalyst\n").unwrap();
        assert_eq!(records[0]["description"], vec!["Managed Cisco Catalyst"]);
    }

    #[test]
    fn empty_output_has_no_records() {
        assert!(parse_ldif("").unwrap().is_empty());
    }

    #[test]
    fn decodes_base64_values() {
        let records = parse_ldif("cn: acid\ndescription:: Q2Fmw6kgc2VydmVy\n").unwrap();
        assert_eq!(records[0]["description"], vec!["Café server"]);
        assert_eq!(records[0]["cn"], vec!["acid"]);
    }

    #[test]
    fn decodes_wrapped_base64_values() {
        let records = parse_ldif("cn: acid\ndescription:: Q2Fmw6kgc2\n VydmVy\n").unwrap();
        assert_eq!(records[0]["description"], vec!["Café server"]);
    }

    #[test]
    fn invalid_base64_is_an_error() {
        assert!(matches!(
            parse_ldif("cn: acid\ndescription:: !!!not base64\n"),
            Err(DirectoryError::Base64(attribute, _)) if attribute == "description"
        ));
    }

    #[test]
    fn non_utf8_value_is_an_error() {
        // 0xff 0xfe
        assert!(matches!(
            parse_ldif("cn: acid\ndescription:: //4=\n"),
            Err(DirectoryError::Utf8(attribute, _)) if attribute == "description"
        ));
    }
}
