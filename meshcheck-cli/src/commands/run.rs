//! `meshcheck run` command handler
//!
//! Each feature document is one module scope: it gets its own pair of models
//! (control plane + sample application) unless names are given on the command line.

use std::io::Write;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use meshcheck_core::config::MeshcheckConfig;
use meshcheck_core::process::ProcessRunner;
use meshcheck_core::types::Environment;
use meshcheck_scenario::{FeatureReport, FeatureRunner, Harness, ModuleContext, ScenarioOutcome};

use super::check::check_features;
use super::load_features;
use crate::cli::RunArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `run` command.
pub async fn execute(
    args: RunArgs,
    config: &MeshcheckConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let features = load_features(&args.features).await?;
    let harness = Harness::from_config(Arc::new(ProcessRunner::new()), config.clone())
        .map_err(|e| CliError::Core(e.into()))?;
    let runner = FeatureRunner::new(Arc::new(harness))?;

    if !args.no_check {
        let check = check_features(&runner, &features);
        if !check.unresolved.is_empty() {
            writer.render(&check)?;
            return Err(CliError::UnresolvedSteps {
                count: check.unresolved.len(),
            });
        }
    }

    let mut reports = Vec::with_capacity(features.len());
    for feature in &features {
        let module = module_context(args.istio_model.as_deref(), args.model.as_deref());
        info!(
            feature = feature.name.as_str(),
            istio_system = module.istio_system.name(),
            bookinfo = module.bookinfo.name(),
            "running feature"
        );
        reports.push(runner.run_feature(feature, module).await);
    }

    let summary = RunSummary::new(reports);
    writer.render(&summary)?;

    if summary.failed > 0 {
        warn!(failed = summary.failed, "run finished with failures");
        return Err(CliError::ScenariosFailed {
            failed: summary.failed,
        });
    }
    Ok(())
}

fn module_context(istio_model: Option<&str>, model: Option<&str>) -> ModuleContext {
    let id = generated_suffix();
    let istio_system = istio_model.map_or_else(|| format!("istio-system-{id}"), str::to_owned);
    let bookinfo = model.map_or_else(|| format!("bookinfo-{id}"), str::to_owned);
    ModuleContext::new(Environment::new(istio_system), Environment::new(bookinfo))
}

fn generated_suffix() -> String {
    format!("{:08x}", Uuid::new_v4().as_fields().0)
}

/// Result of a `run` invocation across all feature documents.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub xfailed: usize,
    pub xpassed: usize,
    pub features: Vec<FeatureReport>,
}

impl RunSummary {
    pub fn new(features: Vec<FeatureReport>) -> Self {
        Self {
            passed: features.iter().map(FeatureReport::passed).sum(),
            failed: features.iter().map(FeatureReport::failed).sum(),
            xfailed: features.iter().map(FeatureReport::xfailed).sum(),
            xpassed: features.iter().map(FeatureReport::xpassed).sum(),
            features,
        }
    }
}

impl Render for RunSummary {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        for feature in &self.features {
            writeln!(w, "Feature: {}", feature.name.bold())?;
            for scenario in &feature.scenarios {
                let label = match &scenario.outcome {
                    ScenarioOutcome::Passed => "PASS".green(),
                    ScenarioOutcome::Failed { .. } => "FAIL".red().bold(),
                    ScenarioOutcome::XFailed { .. } => "XFAIL".yellow(),
                    ScenarioOutcome::XPassed { .. } => "XPASS".yellow().bold(),
                };
                writeln!(
                    w,
                    "  {:<5} {} ({} ms)",
                    label, scenario.name, scenario.duration_ms
                )?;
                match &scenario.outcome {
                    ScenarioOutcome::Failed { step, error } => {
                        writeln!(w, "        at: {step}")?;
                        writeln!(w, "        {}", error.red())?;
                    }
                    ScenarioOutcome::XFailed { reason, .. }
                    | ScenarioOutcome::XPassed { reason }
                        if !reason.is_empty() =>
                    {
                        writeln!(w, "        reason: {reason}")?;
                    }
                    _ => {}
                }
            }
        }

        writeln!(w)?;
        let failed = self.failed.to_string();
        writeln!(
            w,
            "{} passed, {} failed, {} xfailed, {} xpassed",
            self.passed.to_string().green(),
            if self.failed > 0 {
                failed.red().bold()
            } else {
                failed.normal()
            },
            self.xfailed,
            self.xpassed
        )?;
        Ok(())
    }
}
