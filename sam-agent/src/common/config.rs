/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::common::ConfigError;

/// Registration heartbeat period used when none (or zero) is configured.
pub const DEFAULT_REGISTRATION_INTERVAL_MS: u64 = 30_000;

/// File name looked up inside the XDG configuration directory.
pub const CONFIG_FILE_NAME: &str = "agent.toml";

/// Configuration for a mesh agent.
///
/// Loaded from TOML, typically from `$XDG_CONFIG_HOME/<app_name>/agent.toml`.
/// Every section is optional; missing values fall back to their defaults.
///
/// ```toml
/// [broker]
/// url = "ws://localhost:8008"
/// vpn = "default"
/// username = "default"
/// password = "default"
///
/// [agent]
/// name = "weather"
/// description = "A weather agent that provides current conditions and forecasts"
/// always_open = true
///
/// [mesh]
/// namespace = "test/"
/// registration_interval_ms = 30000
///
/// [limits]
/// max_concurrent_invocations = 16
///
/// [tracing]
/// filter = "info,sam_agent=debug"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Broker connection parameters, handed to the transport untouched.
    pub broker: BrokerConfig,
    /// Identity published in the registration summary.
    pub agent: AgentIdentity,
    /// Topic namespace and heartbeat settings.
    pub mesh: MeshConfig,
    /// Dispatch limits.
    pub limits: LimitsConfig,
    /// Logging setup used by [`init_tracing`](crate::logging::init_tracing).
    pub tracing: TracingConfig,
}

/// Broker connection parameters.
///
/// The agent never reads these; they exist so one file can configure both the
/// agent and whichever transport the application builds.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Broker URL, e.g. `ws://localhost:8008`.
    pub url: String,
    /// Message VPN name.
    pub vpn: String,
    /// Client username.
    pub username: String,
    /// Client password.
    pub password: String,
}

impl fmt::Debug for BrokerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerConfig")
            .field("url", &self.url)
            .field("vpn", &self.vpn)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Human-facing identity of the agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentIdentity {
    /// Display name. Published verbatim and used for addressee matching.
    pub name: String,
    /// Free-form description for discovery.
    pub description: String,
    /// Informational flag surfaced in the registration summary.
    pub always_open: bool,
}

/// Mesh-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Prefix applied to every topic, e.g. `"test/"`. Empty by default.
    pub namespace: String,
    /// Heartbeat period in milliseconds. Zero means the default.
    pub registration_interval_ms: u64,
}

/// Dispatch limits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Upper bound on in-flight action invocations. `None` leaves dispatch uncapped.
    pub max_concurrent_invocations: Option<usize>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub filter: String,
    /// Directory for a daily rolling log file. Logs go to stdout when unset.
    pub log_directory: Option<PathBuf>,
    /// File name prefix for the rolling log file.
    pub log_file_prefix: String,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            registration_interval_ms: DEFAULT_REGISTRATION_INTERVAL_MS,
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            log_directory: None,
            log_file_prefix: "sam-agent".to_string(),
        }
    }
}

impl AgentConfig {
    /// Creates a configuration for an agent with the given identity and defaults elsewhere.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            agent: AgentIdentity {
                name: name.into(),
                description: description.into(),
                always_open: false,
            },
            ..Self::default()
        }
    }

    /// Sets the topic namespace prefix.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.mesh.namespace = namespace.into();
        self
    }

    /// Sets the registration heartbeat period.
    #[must_use]
    pub fn with_registration_interval(mut self, interval: Duration) -> Self {
        self.mesh.registration_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the informational `always_open` flag.
    #[must_use]
    pub fn with_always_open(mut self, always_open: bool) -> Self {
        self.agent.always_open = always_open;
        self
    }

    /// Caps the number of concurrently running action invocations.
    #[must_use]
    pub fn with_max_concurrent_invocations(mut self, limit: usize) -> Self {
        self.limits.max_concurrent_invocations = Some(limit);
        self
    }

    /// Heartbeat period, substituting the default for zero.
    #[must_use]
    pub const fn registration_interval(&self) -> Duration {
        if self.mesh.registration_interval_ms == 0 {
            Duration::from_millis(DEFAULT_REGISTRATION_INTERVAL_MS)
        } else {
            Duration::from_millis(self.mesh.registration_interval_ms)
        }
    }

    /// Checks the values an agent cannot run without.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the agent name is blank or the
    /// invocation limit is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.name.trim().is_empty() {
            return Err(ConfigError::Invalid("agent.name must not be empty".to_string()));
        }
        if self.limits.max_concurrent_invocations == Some(0) {
            return Err(ConfigError::Invalid(
                "limits.max_concurrent_invocations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not valid for this schema.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read and
    /// [`ConfigError::Parse`] if its contents are malformed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        info!("Loaded agent configuration from {}", path.display());
        Ok(config)
    }

    /// Loads configuration from the XDG configuration directory for `app_name`.
    ///
    /// Looks for `$XDG_CONFIG_HOME/<app_name>/agent.toml` (falling back through the
    /// XDG config search path). A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the XDG directories cannot be resolved or if a file is
    /// found but cannot be read or parsed.
    pub fn load(app_name: &str) -> Result<Self, ConfigError> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix(app_name)
            .map_err(|e| ConfigError::Xdg(e.to_string()))?;

        match xdg_dirs.find_config_file(CONFIG_FILE_NAME) {
            Some(path) => Self::from_file(path),
            None => {
                info!("No {CONFIG_FILE_NAME} found for {app_name}, using defaults");
                let config = Self::default();
                trace!(?config, "Default agent configuration");
                Ok(config)
            }
        }
    }
}
