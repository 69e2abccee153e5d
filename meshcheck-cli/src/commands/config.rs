//! `meshcheck config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use meshcheck_core::config::MeshcheckConfig;

use super::load_config;
use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Load and validate the configuration, reporting the first error found.
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = match load_config(config_path).await {
        Ok(loaded) => ConfigValidationReport {
            source: source_label(loaded.source.as_deref()),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }
    Ok(())
}

/// Display the effective configuration (file + env overrides + defaults).
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let loaded = load_config(config_path).await?;
    let report = ConfigReport {
        source: source_label(loaded.source.as_deref()),
        config_toml: render_section(&loaded.config, section.as_deref())?,
        section,
    };
    writer.render(&report)?;
    Ok(())
}

fn render_section(config: &MeshcheckConfig, section: Option<&str>) -> Result<String, CliError> {
    let rendered = match section {
        None => toml::to_string_pretty(config),
        Some("general") => toml::to_string_pretty(&config.general),
        Some("terraform") => toml::to_string_pretty(&config.terraform),
        Some("deploy") => toml::to_string_pretty(&config.deploy),
        Some("convergence") => toml::to_string_pretty(&config.convergence),
        Some("probe") => toml::to_string_pretty(&config.probe),
        Some("cluster") => toml::to_string_pretty(&config.cluster),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {other} (expected: general, terraform, deploy, convergence, probe, cluster)"
            )));
        }
    };
    rendered.map_err(|e| CliError::Command(format!("failed to serialize configuration: {e}")))
}

fn source_label(source: Option<&Path>) -> String {
    source.map_or_else(
        || "defaults".to_owned(),
        |path| path.display().to_string(),
    )
}

/// Configuration display report.
///
/// The `config_toml` field is only used for text rendering.
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration file path, or `defaults`
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{section}]");
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;
        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;
        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }
        Ok(())
    }
}
