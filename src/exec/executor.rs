use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::config::ToolConfig;
use crate::error::{Result, SlurmError};
use crate::exec::{which, Tool};

/// How a non-zero exit status is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPolicy {
    /// Return the output whatever the exit status. Used by every query,
    /// since "ran but found nothing" must not look like "tool missing".
    Lenient,
    /// Turn a non-zero exit into [`SlurmError::Execution`].
    Strict,
}

/// Captured result of one command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs Slurm commands as blocking child processes.
///
/// Every invocation first resolves the tool through the configured search
/// path, so a missing command surfaces as [`SlurmError::ToolUnavailable`]
/// before anything is spawned.
#[derive(Debug, Clone, Default)]
pub struct CommandExecutor {
    config: ToolConfig,
}

impl CommandExecutor {
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// Resolve the executable backing `tool`, if present.
    pub fn locate(&self, tool: Tool) -> Option<PathBuf> {
        which::find_executable(
            self.config.command_name(tool),
            self.config.search_path.as_deref(),
        )
    }

    pub fn is_available(&self, tool: Tool) -> bool {
        self.locate(tool).is_some()
    }

    /// Like [`locate`](Self::locate) but fails with `ToolUnavailable`.
    pub fn require(&self, tool: Tool) -> Result<PathBuf> {
        self.locate(tool)
            .ok_or_else(|| SlurmError::ToolUnavailable(tool.name().to_string()))
    }

    /// Run `tool` leniently: a non-zero exit is returned as data.
    pub fn run(&self, tool: Tool, args: &[String]) -> Result<CommandOutput> {
        self.run_with(tool, args, ExitPolicy::Lenient)
    }

    pub fn run_strict(&self, tool: Tool, args: &[String]) -> Result<CommandOutput> {
        self.run_with(tool, args, ExitPolicy::Strict)
    }

    pub fn run_with(&self, tool: Tool, args: &[String], policy: ExitPolicy) -> Result<CommandOutput> {
        let program = self.require(tool)?;
        tracing::debug!(tool = %tool, program = %program.display(), ?args, "Running command");

        let result = Command::new(&program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output();

        Self::process_output(tool, args, policy, result)
    }

    fn process_output(
        tool: Tool,
        args: &[String],
        policy: ExitPolicy,
        result: std::io::Result<std::process::Output>,
    ) -> Result<CommandOutput> {
        match result {
            Ok(output) => {
                let captured = CommandOutput {
                    exit_code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                };

                tracing::debug!(
                    tool = %tool,
                    exit_code = ?captured.exit_code,
                    stdout_bytes = captured.stdout.len(),
                    "Command finished"
                );

                if policy == ExitPolicy::Strict && !output.status.success() {
                    return Err(SlurmError::Execution {
                        command: command_line(tool, args),
                        status: output.status.to_string(),
                        stderr: captured.stderr.trim().to_string(),
                    });
                }
                Ok(captured)
            }
            Err(e) => {
                tracing::error!(tool = %tool, error = %e, "Failed to launch command");
                Err(SlurmError::Execution {
                    command: command_line(tool, args),
                    status: "not started".to_string(),
                    stderr: e.to_string(),
                })
            }
        }
    }
}

fn command_line(tool: Tool, args: &[String]) -> String {
    std::iter::once(tool.name())
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}
