use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::client::Slurm;
use crate::error::{Result, SlurmError};
use crate::exec::Tool;
use crate::jobs::{Job, JobState};
use crate::parse::parse_key_values;

/// A job bound to the cluster it lives on.
///
/// Methods that query the scheduler refresh the job's cached state and so
/// take `&mut self`; sharing one handle between threads needs a lock of the
/// caller's choosing.
#[derive(Debug, Clone)]
pub struct JobHandle<'a> {
    slurm: &'a Slurm,
    job: Job,
}

impl<'a> JobHandle<'a> {
    pub fn new(slurm: &'a Slurm, job: Job) -> Self {
        Self { slurm, job }
    }

    pub fn id(&self) -> u64 {
        self.job.id
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn into_job(self) -> Job {
        self.job
    }

    /// State seen by the most recent query, without querying.
    pub fn last_state(&self) -> Option<JobState> {
        self.job.last_state()
    }

    /// Query the scheduler for the current state and cache it.
    pub fn status(&mut self) -> Result<JobState> {
        let state = self.slurm.job_state(self.job.id)?;
        self.job.set_last_state(state);
        Ok(state)
    }

    pub fn is_running(&mut self) -> Result<bool> {
        Ok(self.status()?.is_active())
    }

    pub fn is_finished(&mut self) -> Result<bool> {
        Ok(self.status()?.is_terminal())
    }

    /// Poll until the job reaches a terminal state.
    ///
    /// With a `timeout`, gives up once it has elapsed and returns the last
    /// observed state, which may be non-terminal. The job itself is left
    /// alone. A zero timeout queries exactly once.
    pub fn wait(&mut self, poll_interval: Duration, timeout: Option<Duration>) -> Result<JobState> {
        let started = Instant::now();
        loop {
            let state = self.status()?;
            if state.is_terminal() {
                tracing::info!(job_id = self.job.id, %state, "Job finished");
                return Ok(state);
            }

            let pause = match timeout {
                Some(limit) => {
                    let elapsed = started.elapsed();
                    if elapsed >= limit {
                        tracing::debug!(job_id = self.job.id, %state, "Wait timed out");
                        return Ok(state);
                    }
                    poll_interval.min(limit - elapsed)
                }
                None => poll_interval,
            };
            std::thread::sleep(pause);
        }
    }

    /// Ask the scheduler to cancel the job. Does not wait for it to stop.
    pub fn cancel(&self) -> Result<()> {
        self.slurm.cancel(self.job.id)
    }

    /// Full `scontrol show job` record. Empty once the job has been purged.
    pub fn info(&self) -> Result<BTreeMap<String, String>> {
        self.slurm.job_info(self.job.id)
    }

    /// Last `lines` lines of the job's stdout file.
    pub fn tail(&self, lines: usize) -> Result<String> {
        let path = self.job.stdout_path.as_ref().ok_or_else(|| {
            SlurmError::LogUnavailable(format!("stdout path of job {} is unknown", self.job.id))
        })?;
        if !path.is_file() {
            return Err(SlurmError::LogUnavailable(format!(
                "stdout file not found at {}",
                path.display()
            )));
        }

        let bytes = std::fs::read(path)?;
        let text = String::from_utf8_lossy(&bytes);
        let all: Vec<&str> = text.split_inclusive('\n').collect();
        Ok(all[all.len().saturating_sub(lines)..].concat())
    }
}

impl Slurm {
    /// Wrap an existing job, e.g. one returned by `list_jobs`.
    pub fn handle(&self, job: Job) -> JobHandle<'_> {
        JobHandle::new(self, job)
    }

    /// Send `scancel` for job `id`.
    pub fn cancel(&self, id: u64) -> Result<()> {
        let output = self.executor().run(Tool::Scancel, &[id.to_string()])?;
        if output.success() {
            tracing::info!(job_id = id, "Cancellation requested");
        } else {
            tracing::warn!(job_id = id, stderr = output.stderr.trim(), "scancel reported an error");
        }
        Ok(())
    }

    /// `scontrol -o show job <id>` as key/value pairs.
    pub fn job_info(&self, id: u64) -> Result<BTreeMap<String, String>> {
        let args = ["-o", "show", "job"]
            .into_iter()
            .map(String::from)
            .chain(std::iter::once(id.to_string()))
            .collect::<Vec<_>>();
        let output = self.executor().run(Tool::Scontrol, &args)?;
        Ok(output
            .stdout
            .lines()
            .find(|line| !line.trim().is_empty())
            .map(parse_key_values)
            .unwrap_or_default())
    }
}
