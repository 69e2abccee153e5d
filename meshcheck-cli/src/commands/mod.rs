//! Command handlers -- one module per subcommand

pub mod check;
pub mod config;
pub mod run;
pub mod steps;

use std::path::{Path, PathBuf};

use meshcheck_core::config::MeshcheckConfig;
use meshcheck_scenario::Feature;

use crate::error::CliError;

/// Effective configuration and where it came from.
pub struct LoadedConfig {
    pub config: MeshcheckConfig,
    /// `None` when no file exists and defaults plus env overrides are used.
    pub source: Option<PathBuf>,
}

/// Load the configuration file, or fall back to defaults when it does not exist.
///
/// Environment overrides and validation apply in both cases.
pub async fn load_config(path: &Path) -> Result<LoadedConfig, CliError> {
    if tokio::fs::try_exists(path).await? {
        let config = MeshcheckConfig::load(path).await?;
        return Ok(LoadedConfig {
            config,
            source: Some(path.to_path_buf()),
        });
    }

    let mut config = MeshcheckConfig::default();
    config.apply_env_overrides();
    config.validate()?;
    Ok(LoadedConfig {
        config,
        source: None,
    })
}

/// Load every feature document, in order.
pub async fn load_features(paths: &[PathBuf]) -> Result<Vec<Feature>, CliError> {
    let mut features = Vec::with_capacity(paths.len());
    for path in paths {
        let feature = Feature::load(path).await.map_err(|e| {
            CliError::Config(format!("{}: {}", path.display(), e))
        })?;
        features.push(feature);
    }
    Ok(features)
}
