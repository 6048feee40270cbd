//! Client Configuration
//!
//! The credential collaborator hands the client a semicolon-delimited list
//! of candidate REST URLs plus a username and password. Encoding and
//! storage of those credentials is not handled here.

use crate::constants::{LOGIN_SOCKET_TIMEOUT, QOS_NAME_PREFIX, SOCKET_TIMEOUT};
use crate::domain::Product;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for one array client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ArrayConfig {
    /// Candidate REST URLs separated by `;`, each ending with `/`
    pub rest_url: String,
    /// Array account name
    pub username: String,
    /// Array account password
    #[serde(skip_serializing)]
    pub password: String,
    /// NAS product family
    pub product: Option<Product>,
    /// Logical IPs shares are exported on
    pub logical_ips: Vec<String>,
    /// Name prefix of QoS policies owned by this client
    pub qos_name_prefix: String,
    /// Timeout of ordinary calls in seconds
    pub call_timeout_secs: u64,
    /// Timeout of the login exchange in seconds
    pub login_timeout_secs: u64,
}

impl Default for ArrayConfig {
    fn default() -> Self {
        Self {
            rest_url: String::new(),
            username: String::new(),
            password: String::new(),
            product: None,
            logical_ips: Vec::new(),
            qos_name_prefix: QOS_NAME_PREFIX.to_string(),
            call_timeout_secs: SOCKET_TIMEOUT.as_secs(),
            login_timeout_secs: LOGIN_SOCKET_TIMEOUT.as_secs(),
        }
    }
}

impl ArrayConfig {
    pub fn new(
        rest_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            rest_url: rest_url.into(),
            username: username.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    /// Load and validate a YAML configuration file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::load_yaml_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML configuration file that other sources may still complete
    ///
    /// Call [`ArrayConfig::validate`] once every source has been applied.
    pub fn load_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }

    /// Candidate base URLs in configured order
    pub fn candidate_urls(&self) -> Vec<String> {
        self.rest_url
            .split(';')
            .map(|url| url.trim_matches(|c: char| c.is_whitespace()))
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.candidate_urls().is_empty() {
            return Err(Error::Configuration("RestURL is not configured".into()));
        }
        if self.username.is_empty() || self.password.is_empty() {
            return Err(Error::Configuration(
                "UserName and UserPassword must be configured".into(),
            ));
        }
        if self.call_timeout_secs == 0 || self.login_timeout_secs == 0 {
            return Err(Error::Configuration("Timeouts must be non-zero".into()));
        }
        Ok(())
    }
}
