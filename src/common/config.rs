//! Runner settings
//!
//! Settings are layered: built-in defaults, then the optional settings file
//! at the platform config dir, then command-line overrides.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use super::paths::config_path;
use super::{Error, Result};

/// Main settings structure
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Verification attempts per test case before giving up
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Seconds to sleep between failed verification attempts
    #[serde(default = "default_retry_interval")]
    pub retry_interval_secs: u64,

    /// Timeout for a single HTTP request, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Accept invalid TLS certificates from the service under test
    #[serde(default)]
    pub insecure: bool,

    /// kubectl program name or path
    #[serde(default = "default_kubectl")]
    pub kubectl: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            retry_interval_secs: default_retry_interval(),
            request_timeout_secs: default_request_timeout(),
            insecure: false,
            kubectl: default_kubectl(),
        }
    }
}

fn default_retries() -> u32 {
    50
}
fn default_retry_interval() -> u64 {
    2
}
fn default_request_timeout() -> u64 {
    2
}
fn default_kubectl() -> String {
    "kubectl".to_string()
}

/// Command-line overrides applied on top of the loaded settings
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub retries: Option<u32>,
    pub retry_interval_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub insecure: bool,
    pub kubectl: Option<String>,
}

impl Settings {
    /// Load settings from the default settings file
    ///
    /// Returns default settings if the file doesn't exist
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load settings from an explicit TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, &e))?;
        Self::parse(&content)
    }

    /// Parse settings from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))?;
        settings.validate()
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, overrides: Overrides) -> Result<Self> {
        if let Some(retries) = overrides.retries {
            self.retries = retries;
        }
        if let Some(interval) = overrides.retry_interval_secs {
            self.retry_interval_secs = interval;
        }
        if let Some(timeout) = overrides.request_timeout_secs {
            self.request_timeout_secs = timeout;
        }
        if let Some(kubectl) = overrides.kubectl {
            self.kubectl = kubectl;
        }
        self.insecure |= overrides.insecure;
        self.validate()
    }

    fn validate(self) -> Result<Self> {
        if self.retries == 0 {
            return Err(Error::Config("retries must be at least 1".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
