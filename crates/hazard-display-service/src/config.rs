//! Service configuration file.

use anyhow::{Context, Result};
use hazard_arbiter::{ArbiterConfig, AssetCatalog, SuppressionFlags};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default capacity of the session command channel.
pub const DEFAULT_COMMAND_BUFFER: usize = 64;

/// Everything `hazardd` reads at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Arbiter timing.
    pub arbiter: ArbiterConfig,
    /// Initial suppression flags.
    pub flags: SuppressionFlags,
    /// Asset catalog override; the embedded catalog is used when unset.
    pub asset_catalog: Option<PathBuf>,
    /// Capacity of the session command channel.
    pub command_buffer: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            arbiter: ArbiterConfig::default(),
            flags: SuppressionFlags::default(),
            asset_catalog: None,
            command_buffer: DEFAULT_COMMAND_BUFFER,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a YAML file.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub async fn load(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse and validate a YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not parse or fails validation.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the arbiter timing is invalid or the command
    /// buffer is empty.
    pub fn validate(&self) -> Result<()> {
        self.arbiter
            .validate()
            .context("Invalid arbiter configuration")?;
        anyhow::ensure!(self.command_buffer > 0, "command_buffer must be positive");
        Ok(())
    }

    /// Load the asset catalog, from the override file when one is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read or is incomplete.
    pub async fn load_catalog(&self) -> Result<AssetCatalog> {
        let Some(path) = &self.asset_catalog else {
            return AssetCatalog::load_default().context("Embedded asset catalog is invalid");
        };

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read asset catalog: {}", path.display()))?;
        let catalog = AssetCatalog::from_yaml(&content)
            .with_context(|| format!("Invalid asset catalog: {}", path.display()))?;
        info!(path = %path.display(), "loaded asset catalog override");
        Ok(catalog)
    }
}
