//! `meshcheck steps` command handler

use std::io::Write;

use serde::Serialize;

use meshcheck_scenario::steps;

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `steps` command.
pub fn execute(writer: &OutputWriter) -> Result<(), CliError> {
    let registry = steps::registry()?;
    let report = StepsReport {
        steps: registry
            .definitions()
            .iter()
            .map(|def| StepEntry {
                keyword: def.keyword().to_string(),
                pattern: def.pattern().source().to_owned(),
                params: def.pattern().params().to_vec(),
            })
            .collect(),
    };
    writer.render(&report)?;
    Ok(())
}

/// Registered step vocabulary.
#[derive(Serialize)]
pub struct StepsReport {
    pub steps: Vec<StepEntry>,
}

#[derive(Serialize)]
pub struct StepEntry {
    pub keyword: String,
    pub pattern: String,
    pub params: Vec<String>,
}

impl Render for StepsReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Registered steps ({}):", self.steps.len())?;
        for step in &self.steps {
            writeln!(w, "  {:<6} {}", step.keyword.bold(), step.pattern)?;
        }
        Ok(())
    }
}
