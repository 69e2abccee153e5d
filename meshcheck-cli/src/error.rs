//! CLI-specific error types and exit code mapping

use meshcheck_core::error::MeshcheckError;
use meshcheck_scenario::StepError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// One or more scenarios failed.
    #[error("{failed} scenario(s) failed")]
    ScenariosFailed { failed: usize },

    /// Feature documents contain steps without a unique definition.
    #[error("{count} step(s) could not be resolved")]
    UnresolvedSteps { count: usize },

    /// Step registry construction failed.
    #[error("step registry error: {0}")]
    Registry(#[from] StepError),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from meshcheck-core.
    #[error("{0}")]
    Core(MeshcheckError),
}

impl From<MeshcheckError> for CliError {
    fn from(err: MeshcheckError) -> Self {
        match err {
            MeshcheckError::Config(e) => Self::Config(e.to_string()),
            other => Self::Core(other),
        }
    }
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                  |
    /// |------|------------------------------------------|
    /// | 0    | All scenarios passed or failed as expected |
    /// | 1    | Scenario failure or runtime error        |
    /// | 2    | Configuration or feature document error  |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::UnresolvedSteps { .. } => 2,
            Self::Command(_)
            | Self::ScenariosFailed { .. }
            | Self::Registry(_)
            | Self::JsonSerialize(_)
            | Self::Io(_)
            | Self::Core(_) => 1,
        }
    }
}
