use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlurmError {
    #[error("Slurm command unavailable: {0} not found on the search path")]
    ToolUnavailable(String),

    #[error("Could not parse job id from sbatch output.\nstdout:\n{stdout}\nstderr:\n{stderr}")]
    SubmissionFailed { stdout: String, stderr: String },

    #[error("Command `{command}` failed ({status}): {stderr}")]
    Execution {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Unknown {tool} field: {field}")]
    UnknownField { tool: String, field: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Log file unavailable: {0}")]
    LogUnavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SlurmError {
    /// True when the error means a backing tool is missing, as opposed to a
    /// tool that ran and failed.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, SlurmError::ToolUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, SlurmError>;
