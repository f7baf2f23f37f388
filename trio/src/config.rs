//! TOML configuration for a whole trio.
//!
//! ```toml
//! [coordinator]
//! mode = "parallel"
//!
//! [coordinator.deadlines]
//! analyze = 2000
//! decide = 2000
//! act = 1000
//! total = 3000
//!
//! [workers.strategist]
//! transport = "remote"
//! url = "http://127.0.0.1:3002/mcp"
//! ```
//!
//! Every section is optional. Missing workers run in-process, missing
//! deadlines take [`StageDeadlines::default`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use trio_capability::RegistryError;
use trio_coord::{CoordinatorConfig, StageDeadlines};
use trio_protocol::{TransportKind, WorkerRole};

/// Errors from loading or applying a [`SystemConfig`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not valid TOML or does not match the schema.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The values are well-formed but unusable.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// A local worker's capability set could not be built.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Port a role's HTTP worker listens on by default.
pub fn default_port(role: WorkerRole) -> u16 {
    match role {
        WorkerRole::Scout => 3001,
        WorkerRole::Strategist => 3002,
        WorkerRole::Executor => 3003,
    }
}

/// JSON-RPC URL of a role's worker on `host` at its default port.
pub fn default_url(host: &str, role: WorkerRole) -> String {
    format!("http://{host}:{}/mcp", default_port(role))
}

/// How one worker is reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// In-process or JSON-RPC over HTTP.
    #[serde(default = "default_transport")]
    pub transport: TransportKind,
    /// JSON-RPC endpoint. Required for remote workers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

fn default_transport() -> TransportKind {
    TransportKind::Local
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self::local()
    }
}

impl WorkerConfig {
    /// An in-process worker.
    pub fn local() -> Self {
        Self {
            transport: TransportKind::Local,
            url: None,
        }
    }

    /// A worker reached at `url`.
    pub fn remote(url: impl Into<String>) -> Self {
        Self {
            transport: TransportKind::Remote,
            url: Some(url.into()),
        }
    }
}

/// The three workers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkersConfig {
    /// Scout.
    pub scout: WorkerConfig,
    /// Strategist.
    pub strategist: WorkerConfig,
    /// Executor.
    pub executor: WorkerConfig,
}

impl WorkersConfig {
    /// The entry for `role`.
    pub fn get(&self, role: WorkerRole) -> &WorkerConfig {
        match role {
            WorkerRole::Scout => &self.scout,
            WorkerRole::Strategist => &self.strategist,
            WorkerRole::Executor => &self.executor,
        }
    }

    /// Every worker remote, on `host` at the default ports.
    pub fn remote_on(host: &str) -> Self {
        Self {
            scout: WorkerConfig::remote(default_url(host, WorkerRole::Scout)),
            strategist: WorkerConfig::remote(default_url(host, WorkerRole::Strategist)),
            executor: WorkerConfig::remote(default_url(host, WorkerRole::Executor)),
        }
    }
}

/// Coordinator settings plus worker wiring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Mode and deadlines.
    pub coordinator: CoordinatorConfig,
    /// Where each worker lives.
    pub workers: WorkersConfig,
}

impl SystemConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), mode = %config.coordinator.mode, "config loaded");
        Ok(config)
    }

    /// Reject zero deadlines and remote workers without a usable URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let StageDeadlines {
            analyze,
            decide,
            act,
            total,
        } = self.coordinator.deadlines;
        for (name, value) in [
            ("analyze", analyze),
            ("decide", decide),
            ("act", act),
            ("total", total),
        ] {
            if value.is_zero() {
                return Err(ConfigError::Invalid(format!(
                    "coordinator.deadlines.{name} must be greater than zero"
                )));
            }
        }

        for role in WorkerRole::ALL {
            let worker = self.workers.get(role);
            if worker.transport != TransportKind::Remote {
                continue;
            }
            match worker.url.as_deref() {
                None | Some("") => {
                    return Err(ConfigError::Invalid(format!(
                        "workers.{role}: remote transport requires a url"
                    )));
                }
                Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                    return Err(ConfigError::Invalid(format!(
                        "workers.{role}: url must be http or https, got {url}"
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}
