use std::path::PathBuf;

use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;

use crate::jobs::JobState;

/// A Slurm job as seen by this client.
///
/// Jobs come from two places: [`submit`](crate::Slurm::submit), which knows
/// the log paths but not the times, and [`list_jobs`](crate::Slurm::list_jobs),
/// which knows the times and a state snapshot but not the log paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub id: u64,
    pub name: String,
    pub user: String,
    pub partition: String,
    pub stdout_path: Option<PathBuf>,
    pub stderr_path: Option<PathBuf>,
    pub submit_time: Option<NaiveDateTime>,
    pub start_time: Option<NaiveDateTime>,
    /// Last state observed by a query. Stale as soon as it is read.
    #[serde(rename = "state")]
    last_state: Option<JobState>,
}

impl Job {
    pub fn new(id: u64, name: impl Into<String>, user: impl Into<String>, partition: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            user: user.into(),
            partition: partition.into(),
            stdout_path: None,
            stderr_path: None,
            submit_time: None,
            start_time: None,
            last_state: None,
        }
    }

    pub fn with_logs(mut self, stdout: PathBuf, stderr: PathBuf) -> Self {
        self.stdout_path = Some(stdout);
        self.stderr_path = Some(stderr);
        self
    }

    pub fn with_times(mut self, submit: Option<NaiveDateTime>, start: Option<NaiveDateTime>) -> Self {
        self.submit_time = submit;
        self.start_time = start;
        self
    }

    pub fn with_state(mut self, state: JobState) -> Self {
        self.last_state = Some(state);
        self
    }

    pub fn last_state(&self) -> Option<JobState> {
        self.last_state
    }

    pub fn set_last_state(&mut self, state: JobState) {
        self.last_state = Some(state);
    }

    /// Time spent queued, when both submit and start times are known.
    pub fn wait_time(&self) -> Option<TimeDelta> {
        match (self.submit_time, self.start_time) {
            (Some(submit), Some(start)) => Some(start - submit),
            _ => None,
        }
    }
}
