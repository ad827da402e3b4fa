use std::path::{Path, PathBuf};

use chrono::Local;

use crate::client::Slurm;
use crate::error::{Result, SlurmError};
use crate::exec::Tool;
use crate::jobs::{Job, JobHandle};
use crate::parse::parse_walltime;

/// Placeholder Slurm replaces with the job id in log file names.
pub const JOB_ID_PLACEHOLDER: &str = "%j";

const SUBMITTED_PREFIX: &str = "Submitted batch job ";

/// What the job runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobCommand {
    /// Program and arguments; quoted for the shell on submission.
    Args(Vec<String>),
    /// A command line passed to the shell as-is.
    Shell(String),
}

impl JobCommand {
    pub fn to_shell(&self) -> String {
        match self {
            JobCommand::Args(args) => args
                .iter()
                .map(|arg| shell_quote(arg))
                .collect::<Vec<_>>()
                .join(" "),
            JobCommand::Shell(line) => line.clone(),
        }
    }
}

impl From<&str> for JobCommand {
    fn from(line: &str) -> Self {
        JobCommand::Shell(line.to_string())
    }
}

impl From<String> for JobCommand {
    fn from(line: String) -> Self {
        JobCommand::Shell(line)
    }
}

impl From<Vec<String>> for JobCommand {
    fn from(args: Vec<String>) -> Self {
        JobCommand::Args(args)
    }
}

/// Resources and placement for a batch submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub command: JobCommand,
    /// Name prefix; a timestamp suffix is appended.
    pub name: String,
    pub partition: String,
    /// Wall-clock limit, `HH:MM:SS` or `D-HH:MM:SS`.
    pub time: String,
    pub cpus: u32,
    pub memory_gb: u32,
    pub gpus: u32,
    pub stdout_file: PathBuf,
    pub stderr_file: PathBuf,
    /// `--signal` spec, e.g. `SIGUSR1@90`.
    pub signal: String,
    /// Working directory at runtime. Defaults to the current directory.
    pub workdir: Option<PathBuf>,
}

impl SubmitRequest {
    pub fn new(
        command: impl Into<JobCommand>,
        partition: impl Into<String>,
        time: impl Into<String>,
        cpus: u32,
        memory_gb: u32,
        gpus: u32,
    ) -> Self {
        Self {
            command: command.into(),
            name: "job".to_string(),
            partition: partition.into(),
            time: time.into(),
            cpus,
            memory_gb,
            gpus,
            stdout_file: PathBuf::from("./slurm_logs/%j.txt"),
            stderr_file: PathBuf::from("./slurm_logs/%j.err"),
            signal: "SIGUSR1@90".to_string(),
            workdir: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_stdout(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout_file = path.into();
        self
    }

    pub fn with_stderr(mut self, path: impl Into<PathBuf>) -> Self {
        self.stderr_file = path.into();
        self
    }

    pub fn with_signal(mut self, signal: impl Into<String>) -> Self {
        self.signal = signal.into();
        self
    }

    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    fn validate(&self) -> Result<()> {
        if self.partition.trim().is_empty() {
            return Err(SlurmError::InvalidArgument("partition must not be empty".into()));
        }
        if parse_walltime(&self.time).is_none() {
            return Err(SlurmError::InvalidArgument(format!(
                "time limit '{}' is not HH:MM:SS or D-HH:MM:SS",
                self.time
            )));
        }
        if self.cpus == 0 {
            return Err(SlurmError::InvalidArgument("cpus must be at least 1".into()));
        }
        Ok(())
    }
}

impl Slurm {
    /// Submit a batch job and return a handle to it.
    pub fn submit(&self, request: &SubmitRequest) -> Result<JobHandle<'_>> {
        request.validate()?;
        self.executor().require(Tool::Sbatch)?;

        let cwd = std::env::current_dir()?;
        let workdir = match &request.workdir {
            Some(dir) => resolve_path(dir, &cwd),
            None => cwd,
        };
        // sbatch resolves relative log paths against --chdir, not our cwd
        let stdout_file = resolve_path(&request.stdout_file, &workdir);
        let stderr_file = resolve_path(&request.stderr_file, &workdir);
        for file in [&stdout_file, &stderr_file] {
            if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
        }

        let name = format!("{}_{}", request.name, Local::now().format("%Y-%m-%d_%H-%M-%S%.3f"));
        let args = sbatch_args(request, &name, &stdout_file, &stderr_file, &workdir);
        tracing::info!(name = %name, partition = %request.partition, "Submitting job");

        let output = self.executor().run(Tool::Sbatch, &args)?;
        let id = parse_submission(&output.stdout).ok_or_else(|| SlurmError::SubmissionFailed {
            stdout: output.stdout.trim().to_string(),
            stderr: output.stderr.trim().to_string(),
        })?;
        tracing::info!(job_id = id, name = %name, "Job submitted");

        let job = Job::new(id, name, self.config().current_user(), request.partition.clone())
            .with_logs(
                substitute_job_id(&stdout_file, id),
                substitute_job_id(&stderr_file, id),
            );
        Ok(JobHandle::new(self, job))
    }
}

fn sbatch_args(
    request: &SubmitRequest,
    name: &str,
    stdout_file: &Path,
    stderr_file: &Path,
    workdir: &Path,
) -> Vec<String> {
    let mut args = vec![
        format!("--job-name={}", name),
        format!("--partition={}", request.partition),
        format!("--time={}", request.time),
        format!("--cpus-per-task={}", request.cpus),
        format!("--mem={}G", request.memory_gb),
    ];
    if request.gpus > 0 {
        args.push(format!("--gres=gpu:{}", request.gpus));
    }
    args.push(format!("--output={}", stdout_file.display()));
    args.push(format!("--error={}", stderr_file.display()));
    args.push(format!("--signal={}", request.signal));
    args.push(format!("--chdir={}", workdir.display()));
    args.push(format!("--wrap={}", request.command.to_shell()));
    args
}

/// Job id from `sbatch` output, taken from the first
/// `Submitted batch job <id>` line.
pub fn parse_submission(stdout: &str) -> Option<u64> {
    let line = stdout
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with(SUBMITTED_PREFIX))?;
    line[SUBMITTED_PREFIX.len()..]
        .split_whitespace()
        .next()?
        .parse()
        .ok()
}

fn substitute_job_id(path: &Path, id: u64) -> PathBuf {
    PathBuf::from(
        path.to_string_lossy()
            .replace(JOB_ID_PLACEHOLDER, &id.to_string()),
    )
}

/// `path` with `~` expanded, made absolute against `base` when relative.
fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    let path = expand_home(path);
    if path.is_absolute() {
        path
    } else {
        base.join(path.strip_prefix(".").unwrap_or(path.as_path()))
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), std::env::var_os("HOME")) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}

fn shell_quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || "-_.:/%+=,@".contains(ch))
    {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\"'\"'"))
    }
}
