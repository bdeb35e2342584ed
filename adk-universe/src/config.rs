//! Configuration for a universe server connection.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, UniverseError};

/// Environment variable holding the universe server base URL.
pub const SERVER_URL_ENV: &str = "UNIVERSE_SERVER_URL";

/// Environment variable holding the universe name.
pub const UNIVERSE_NAME_ENV: &str = "UNIVERSE_NAME";

static UNIVERSE_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("^[A-Za-z0-9_]+$").expect("unreachable error: invalid universe name pattern")
});

/// Connection parameters for a universe server.
///
/// Deserializes from the host's plugin configuration, which uses the keys
/// `serverUrl` and `universeName` (`universe` is accepted as an alias).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UniverseConfig {
    /// Base URL of the universe server, e.g. `https://store.example`.
    pub server_url: String,
    /// Name of the universe (collection) documents are written to.
    #[serde(alias = "universe")]
    pub universe_name: String,
}

impl UniverseConfig {
    /// Create a new builder for constructing a [`UniverseConfig`].
    pub fn builder() -> UniverseConfigBuilder {
        UniverseConfigBuilder::default()
    }

    /// Load and validate the configuration from `UNIVERSE_SERVER_URL` and
    /// `UNIVERSE_NAME`.
    pub fn from_env() -> Result<Self> {
        let server_url = std::env::var(SERVER_URL_ENV).map_err(|_| {
            UniverseError::ConfigError(format!("{SERVER_URL_ENV} environment variable not set"))
        })?;
        let universe_name = std::env::var(UNIVERSE_NAME_ENV).map_err(|_| {
            UniverseError::ConfigError(format!("{UNIVERSE_NAME_ENV} environment variable not set"))
        })?;
        Self::builder().server_url(server_url).universe_name(universe_name).build()
    }

    /// Check that both fields are present and well formed.
    ///
    /// # Errors
    ///
    /// Returns [`UniverseError::ConfigError`] if:
    /// - `server_url` is empty, not a URL, or cannot carry a path
    /// - `universe_name` is empty or contains characters outside `[A-Za-z0-9_]`
    pub fn validate(&self) -> Result<()> {
        self.base_url()?;
        validate_universe_name(&self.universe_name)
    }

    /// The name under which the host must supply this server's bearer token.
    pub fn credential_name(&self) -> String {
        crate::credentials::credential_name(&self.server_url)
    }

    /// Parse `server_url` into a base URL that endpoint paths can be appended to.
    pub(crate) fn base_url(&self) -> Result<Url> {
        parse_server_url(&self.server_url)
    }
}

/// Parse a server URL, rejecting anything that cannot act as a base for paths.
pub(crate) fn parse_server_url(server_url: &str) -> Result<Url> {
    if server_url.is_empty() {
        return Err(UniverseError::ConfigError("serverUrl is required".to_string()));
    }
    let url = Url::parse(server_url).map_err(|e| {
        UniverseError::ConfigError(format!("serverUrl '{server_url}' is not a valid URL: {e}"))
    })?;
    if url.cannot_be_a_base() {
        return Err(UniverseError::ConfigError(format!(
            "serverUrl '{server_url}' cannot be used as a base URL"
        )));
    }
    Ok(url)
}

fn validate_universe_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(UniverseError::ConfigError("universeName is required".to_string()));
    }
    if !UNIVERSE_NAME_PATTERN.is_match(name) {
        return Err(UniverseError::ConfigError(format!(
            "universeName '{name}' may only contain letters, digits and underscores"
        )));
    }
    Ok(())
}

/// Builder for constructing a validated [`UniverseConfig`].
#[derive(Debug, Clone, Default)]
pub struct UniverseConfigBuilder {
    server_url: Option<String>,
    universe_name: Option<String>,
}

impl UniverseConfigBuilder {
    /// Set the universe server base URL.
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Set the universe name.
    pub fn universe_name(mut self, name: impl Into<String>) -> Self {
        self.universe_name = Some(name.into());
        self
    }

    /// Build the [`UniverseConfig`], validating both fields.
    ///
    /// # Errors
    ///
    /// Returns [`UniverseError::ConfigError`] if a field is missing or
    /// fails [`UniverseConfig::validate`].
    pub fn build(self) -> Result<UniverseConfig> {
        let config = UniverseConfig {
            server_url: self.server_url.unwrap_or_default(),
            universe_name: self.universe_name.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}
