//! Layered client defaults: built-in defaults, an optional `~/.snmp/snmp.yml`, then
//! environment variables, each overriding the last.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Preferred SNMP protocol version, as a config/CLI value (`1` or `2c`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnmpVersionPref {
    #[serde(rename = "1")]
    V1,
    #[serde(rename = "2c")]
    V2c,
}

impl std::str::FromStr for SnmpVersionPref {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1" => Ok(SnmpVersionPref::V1),
            "2c" => Ok(SnmpVersionPref::V2c),
            other => anyhow::bail!("unsupported SNMP version {other:?} (expected \"1\" or \"2c\")"),
        }
    }
}

impl From<SnmpVersionPref> for crate::pdu::SnmpVersion {
    fn from(v: SnmpVersionPref) -> Self {
        match v {
            SnmpVersionPref::V1 => crate::pdu::SnmpVersion::V1,
            SnmpVersionPref::V2c => crate::pdu::SnmpVersion::V2c,
        }
    }
}

/// The client-side defaults a CLI flag falls back to when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientDefaults {
    pub community: String,
    pub version: SnmpVersionPref,
    pub timeout_secs: u64,
    pub retries: u32,
    pub non_repeaters: u32,
    pub max_repetitions: u32,
    pub agent_port: u16,
    pub trap_port: u16,
}

impl Default for ClientDefaults {
    fn default() -> Self {
        ClientDefaults {
            community: "public".to_string(),
            version: SnmpVersionPref::V2c,
            timeout_secs: 1,
            retries: 5,
            non_repeaters: 0,
            max_repetitions: 10,
            agent_port: 161,
            trap_port: 162,
        }
    }
}

impl ClientDefaults {
    /// Load in layers: built-in defaults, an optional YAML file, then environment
    /// variables. A missing config file is not an error; a present-but-malformed one
    /// is. Never touches the network or the MIB table.
    pub fn load() -> Result<ClientDefaults> {
        let mut defaults = ClientDefaults::default();

        if let Some(path) = config_file_path() {
            if path.exists() {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                defaults = serde_yaml::from_str(&contents)
                    .with_context(|| format!("failed to parse {}", path.display()))?;
            }
        }

        defaults.apply_env_overrides();
        Ok(defaults)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("SNMP_COMMUNITY") {
            self.community = v;
        }
        if let Ok(v) = std::env::var("SNMP_VERSION") {
            if let Ok(version) = v.parse() {
                self.version = version;
            }
        }
        if let Ok(v) = std::env::var("SNMP_TIMEOUT") {
            if let Ok(n) = v.parse() {
                self.timeout_secs = n;
            }
        }
        if let Ok(v) = std::env::var("SNMP_RETRIES") {
            if let Ok(n) = v.parse() {
                self.retries = n;
            }
        }
        if let Ok(v) = std::env::var("SNMP_NON_REPEATERS") {
            if let Ok(n) = v.parse() {
                self.non_repeaters = n;
            }
        }
        if let Ok(v) = std::env::var("SNMP_MAX_REPETITIONS") {
            if let Ok(n) = v.parse() {
                self.max_repetitions = n;
            }
        }
    }
}

fn config_file_path() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("SNMP_HOME") {
        return Some(PathBuf::from(home).join("snmp.yml"));
    }
    dirs::home_dir().map(|h| h.join(".snmp").join("snmp.yml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_with_no_file_and_no_env_match_built_in() {
        let defaults = ClientDefaults::default();
        assert_eq!(defaults.community, "public");
        assert_eq!(defaults.version, SnmpVersionPref::V2c);
        assert_eq!(defaults.timeout_secs, 1);
        assert_eq!(defaults.retries, 5);
    }

    #[test]
    #[serial_test::serial]
    fn missing_config_file_is_not_an_error() {
        std::env::set_var("SNMP_HOME", "/nonexistent-snmp-home-for-tests");
        let loaded = ClientDefaults::load().unwrap();
        assert_eq!(loaded.community, "public");
        std::env::remove_var("SNMP_HOME");
    }

    #[test]
    #[serial_test::serial]
    fn malformed_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("SNMP_HOME", dir.path());
        let mut f = std::fs::File::create(dir.path().join("snmp.yml")).unwrap();
        writeln!(f, "community: [this, is, not, a, string}}").unwrap();
        let result = ClientDefaults::load();
        assert!(result.is_err());
        std::env::remove_var("SNMP_HOME");
    }

    #[test]
    #[serial_test::serial]
    fn env_override_wins_over_built_in_default() {
        std::env::set_var("SNMP_HOME", "/nonexistent-snmp-home-for-tests");
        std::env::set_var("SNMP_COMMUNITY", "private-env");
        let loaded = ClientDefaults::load().unwrap();
        assert_eq!(loaded.community, "private-env");
        std::env::remove_var("SNMP_COMMUNITY");
        std::env::remove_var("SNMP_HOME");
    }

    #[test]
    #[serial_test::serial]
    fn file_value_overrides_built_in_and_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("SNMP_HOME", dir.path());
        let mut f = std::fs::File::create(dir.path().join("snmp.yml")).unwrap();
        writeln!(f, "community: from-file\nretries: 9").unwrap();
        drop(f);

        let loaded = ClientDefaults::load().unwrap();
        assert_eq!(loaded.community, "from-file");
        assert_eq!(loaded.retries, 9);

        std::env::set_var("SNMP_RETRIES", "3");
        let loaded = ClientDefaults::load().unwrap();
        assert_eq!(loaded.retries, 3);
        assert_eq!(loaded.community, "from-file");

        std::env::remove_var("SNMP_RETRIES");
        std::env::remove_var("SNMP_HOME");
    }
}
