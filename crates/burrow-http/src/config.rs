//! Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::path::MatchOptions;

/// Default request body limit (4 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 4 * 1024 * 1024;

/// Settings for an [`Engine`](crate::Engine).
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```
/// use burrow_http::Config;
///
/// let config = Config::from_toml_str("strict_routing = true").unwrap();
/// assert!(config.strict_routing);
/// assert!(!config.case_sensitive);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name reported in logs.
    pub app_name: Option<String>,
    /// Treat `/Foo` and `/foo` as different routes.
    pub case_sensitive: bool,
    /// Treat `/foo` and `/foo/` as different routes.
    pub strict_routing: bool,
    /// Largest request body accepted by the socket server, in bytes.
    pub body_limit: usize,
    /// Value of the `Server` header added to every response.
    pub server_header: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: None,
            case_sensitive: false,
            strict_routing: false,
            body_limit: DEFAULT_BODY_LIMIT,
            server_header: None,
        }
    }
}

impl Config {
    /// Parses a configuration from TOML.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Reads and parses a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub(crate) fn match_options(&self) -> MatchOptions {
        MatchOptions {
            case_sensitive: self.case_sensitive,
            strict: self.strict_routing,
        }
    }
}
