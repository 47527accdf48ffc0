//! Indicator-set configuration.
//!
//! A TOML file lists the indicators to compute, file-wide post-processing
//! and the reference-backend preference:
//!
//! ```toml
//! [capabilities]
//! prefer_reference = false
//!
//! [post]
//! offset = 0
//! fill = "ffill"
//!
//! [[indicator]]
//! kind = "jma"
//! source = "close"
//! [indicator.params]
//! length = 7
//! phase = 50
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backend::{Capabilities, ReferenceBackend};
use crate::factory::{build_plan, FactoryError, IndicatorConfig};
use crate::indicator::Planned;
use crate::post::PostProcess;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Factory(#[from] FactoryError),
}

/// Reference-backend preference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityConfig {
    pub prefer_reference: bool,
    /// Name of the backend to use when several are installed.
    pub backend: Option<String>,
}

/// The complete configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterlabConfig {
    pub capabilities: CapabilityConfig,
    pub post: PostProcess,
    #[serde(rename = "indicator")]
    pub indicators: Vec<IndicatorConfig>,
}

impl FilterlabConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Build the compute plan.
    pub fn plan(&self) -> Result<Vec<Planned>, ConfigError> {
        Ok(build_plan(&self.indicators, &self.post)?)
    }

    /// Resolve the capability set against the backends available to this
    /// process. A requested backend that is not installed is logged and
    /// native computation is used.
    pub fn resolve_capabilities(&self, installed: &[Arc<dyn ReferenceBackend>]) -> Capabilities {
        let wanted = self.capabilities.backend.as_deref();
        let found = installed
            .iter()
            .find(|b| wanted.map_or(true, |name| b.name() == name));
        match found {
            Some(backend) => {
                Capabilities::with_backend(Arc::clone(backend), self.capabilities.prefer_reference)
            }
            None => {
                if self.capabilities.prefer_reference || wanted.is_some() {
                    tracing::warn!(
                        backend = wanted.unwrap_or("<any>"),
                        "reference backend not available; computing natively"
                    );
                }
                Capabilities::native()
            }
        }
    }
}
