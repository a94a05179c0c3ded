//! BMC RPC configuration — deserialization and validation.

use crate::error::BmcError;
use crate::mac::normalize_mac;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::path::Path;

/// Strip an env var reference to its variable name.
///
/// Accepts `${VAR_NAME}` syntax only. Returns `None` if the value is not a
/// valid env-var reference.
pub fn parse_env_ref(value: &str) -> Option<&str> {
    value.strip_prefix("${").and_then(|s| s.strip_suffix('}'))
}

/// Resolve a config secret: `${VAR}` reads the environment, anything else is
/// taken literally. Unknown variables resolve to the empty string.
pub fn resolve_secret(value: &str) -> String {
    match parse_env_ref(value) {
        Some(var_name) => std::env::var(var_name).unwrap_or_default(),
        None => value.to_string(),
    }
}

/// Top-level configuration, parsed from YAML.
#[derive(Debug, Clone, Deserialize)]
pub struct BmcConfig {
    pub username: String,
    /// Literal password or a `${VAR}` reference.
    pub password: String,
    /// Controller base URL, e.g. `https://unifi.local:8443`.
    pub api_endpoint: String,
    #[serde(default = "default_site")]
    pub site: String,
    /// Skip TLS certificate verification (controllers ship self-signed certs).
    #[serde(default = "default_insecure")]
    pub insecure: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub machines: HashMap<String, Machine>,
}

/// A logical host: the switch it hangs off and the PoE port powering it.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Machine {
    /// MAC address of the switch.
    pub mac_address: String,
    /// Port index on the switch, kept as text and parsed per request.
    #[serde(deserialize_with = "port_idx_as_text")]
    pub port_idx: String,
}

/// YAML writers use both `port_idx: 2` and `port_idx: "2"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PortIdxRepr {
    Number(i64),
    Text(String),
}

fn port_idx_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match PortIdxRepr::deserialize(deserializer)? {
        PortIdxRepr::Number(n) => n.to_string(),
        PortIdxRepr::Text(s) => s,
    })
}

fn default_site() -> String {
    "default".to_string()
}

fn default_insecure() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

impl BmcConfig {
    /// Parse a config from YAML text. Does not validate.
    pub fn from_yaml_str(yaml: &str, origin: &str) -> crate::Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| BmcError::ConfigParse(origin.to_string(), e))
    }

    /// Read, parse, and validate a config file.
    pub async fn from_file(path: &Path) -> crate::Result<Self> {
        let origin = path.display().to_string();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| BmcError::ConfigRead(origin.clone(), e))?;
        let config = Self::from_yaml_str(&content, &origin)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the config, failing fast before the listener is bound.
    pub fn validate(&self) -> crate::Result<()> {
        let endpoint = self.api_endpoint.trim();
        if endpoint.is_empty() {
            return Err(BmcError::InvalidConfig(
                "'api_endpoint' must not be empty".to_string(),
            ));
        }
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(BmcError::InvalidConfig(format!(
                "'api_endpoint' must be an http(s) URL, got '{}'",
                endpoint
            )));
        }

        if self.username.is_empty() {
            return Err(BmcError::InvalidConfig(
                "'username' must not be empty".to_string(),
            ));
        }

        if self.site.is_empty() {
            return Err(BmcError::InvalidConfig("'site' must not be empty".to_string()));
        }

        for (host, machine) in &self.machines {
            if normalize_mac(&machine.mac_address).is_err() {
                return Err(BmcError::InvalidConfig(format!(
                    "machine '{}' has invalid mac_address '{}'",
                    host, machine.mac_address
                )));
            }
            // Requests for this host will fail with a descriptive error; not fatal here.
            if machine.port_idx.parse::<u32>().is_err() {
                tracing::warn!(
                    host = %host,
                    port_idx = %machine.port_idx,
                    "machine port_idx is not numeric"
                );
            }
        }

        Ok(())
    }
}
