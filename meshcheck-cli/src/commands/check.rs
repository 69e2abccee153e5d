//! `meshcheck check` command handler

use std::io::Write;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use meshcheck_core::config::MeshcheckConfig;
use meshcheck_core::process::ProcessRunner;
use meshcheck_scenario::{Feature, FeatureRunner, Harness};

use super::load_features;
use crate::cli::CheckArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `check` command.
pub async fn execute(
    args: CheckArgs,
    config: &MeshcheckConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let features = load_features(&args.features).await?;
    let harness = Harness::from_config(Arc::new(ProcessRunner::new()), config.clone())
        .map_err(|e| CliError::Core(e.into()))?;
    let runner = FeatureRunner::new(Arc::new(harness))?;

    let report = check_features(&runner, &features);
    writer.render(&report)?;

    if report.unresolved.is_empty() {
        Ok(())
    } else {
        Err(CliError::UnresolvedSteps {
            count: report.unresolved.len(),
        })
    }
}

/// Resolve every step of every feature.
pub fn check_features(runner: &FeatureRunner, features: &[Feature]) -> CheckReport {
    let mut report = CheckReport::default();
    for feature in features {
        let steps: usize = feature.scenarios.iter().map(|s| s.steps.len()).sum();
        let errors = runner.check(feature);
        info!(
            feature = feature.name.as_str(),
            steps,
            unresolved = errors.len(),
            "feature checked"
        );
        report.steps += steps;
        report.unresolved.extend(errors.into_iter().map(|e| UnresolvedStep {
            feature: feature.name.clone(),
            error: e.to_string(),
        }));
    }
    report
}

/// Step resolution report.
#[derive(Debug, Default, Serialize)]
pub struct CheckReport {
    /// Total number of steps checked
    pub steps: usize,
    /// Steps without exactly one matching definition
    pub unresolved: Vec<UnresolvedStep>,
}

#[derive(Debug, Serialize)]
pub struct UnresolvedStep {
    pub feature: String,
    pub error: String,
}

impl Render for CheckReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.unresolved.is_empty() {
            writeln!(
                w,
                "{} all {} steps resolved",
                "OK".green().bold(),
                self.steps
            )?;
            return Ok(());
        }

        writeln!(
            w,
            "{} {} of {} steps could not be resolved",
            "FAIL".red().bold(),
            self.unresolved.len(),
            self.steps
        )?;
        for step in &self.unresolved {
            writeln!(w, "  [{}] {}", step.feature, step.error.red())?;
        }
        Ok(())
    }
}
