//! Harness configuration via `xa-harness.toml`
//!
//! Command-line switches override values from the file; the file overrides
//! the built-in defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use xa_core::{ConnectionParams, XaError, XaResult};

/// Config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "xa-harness.toml";

/// What the driver does after a scenario fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// Stop at the first failed scenario
    #[default]
    FailFast,
    /// Attempt every scenario regardless of earlier failures
    BestEffort,
}

impl RunMode {
    /// Config-file spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::FailFast => "fail-fast",
            RunMode::BestEffort => "best-effort",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunMode {
    type Err = XaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail-fast" => Ok(RunMode::FailFast),
            "best-effort" => Ok(RunMode::BestEffort),
            other => Err(XaError::config(format!(
                "Invalid mode '{}'. Expected \"fail-fast\" or \"best-effort\".",
                other
            ))),
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

/// Harness configuration loaded from `xa-harness.toml`
///
/// # Example
///
/// ```toml
/// mode = "best-effort"
/// transaction_timeout_secs = 60
///
/// [connection]
/// server_type = "memory"
/// properties = "db=xa"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Fail-fast or best-effort
    #[serde(default)]
    pub mode: RunMode,
    /// Timeout passed to every `begin`; 0 disables the timeout
    #[serde(default = "default_timeout_secs")]
    pub transaction_timeout_secs: u64,
    /// Database connection parameters
    #[serde(default)]
    pub connection: ConnectionParams,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::default(),
            transaction_timeout_secs: default_timeout_secs(),
            connection: ConnectionParams::default(),
        }
    }
}

impl HarnessConfig {
    /// Transaction timeout as a `Duration`
    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_secs(self.transaction_timeout_secs)
    }

    /// Returns the default config file content with comments
    pub fn default_toml() -> &'static str {
        r#"# XA harness configuration
#
# Run mode: "fail-fast" (default) or "best-effort"
#   "fail-fast"   = stop at the first failed scenario
#   "best-effort" = attempt every scenario and report all failures
mode = "fail-fast"

# Timeout for each global transaction, in seconds (0 = no timeout)
transaction_timeout_secs = 60

# Database connection parameters. Command-line switches override these.
[connection]
server_type = "memory"        # -T, required
server_name = ""              # -S
user = ""                     # -U
password = ""                 # -P
database = ""                 # -B
properties = "db=xa"          # -R, required
"#
    }

    /// Parse config from TOML text
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if the text is not valid configuration.
    pub fn from_toml_str(content: &str) -> XaResult<Self> {
        toml::from_str(content)
            .map_err(|e| XaError::config(format!("Failed to parse configuration: {}", e)))
    }

    /// Read and parse config from a file path
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> XaResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            XaError::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&content).map_err(|e| {
            XaError::config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Write the default config file if it does not already exist
    ///
    /// Returns true if the file was created.
    pub fn write_default_if_missing(path: &Path) -> XaResult<bool> {
        if path.exists() {
            return Ok(false);
        }
        std::fs::write(path, Self::default_toml()).map_err(|e| {
            XaError::config(format!(
                "Failed to write default config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Ok(true)
    }

    /// Serialize this config to TOML
    pub fn to_toml_string(&self) -> XaResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| XaError::config(format!("Failed to serialize config: {}", e)))
    }
}
