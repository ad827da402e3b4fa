use crate::client::Slurm;
use crate::error::{Result, SlurmError};
use crate::exec::Tool;
use crate::jobs::JobState;
use crate::parse::normalize_state;
use crate::query::QueryFilter;

/// A place a single job's state can be looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSource {
    /// `squeue`: only knows jobs still in the queue.
    LiveQueue,
    /// `sacct`: knows finished jobs within the accounting retention window.
    Accounting,
}

impl StatusSource {
    /// Order in which sources are consulted.
    pub const FALLBACK_ORDER: [StatusSource; 2] = [StatusSource::LiveQueue, StatusSource::Accounting];

    pub fn tool(self) -> Tool {
        match self {
            StatusSource::LiveQueue => Tool::Squeue,
            StatusSource::Accounting => Tool::Sacct,
        }
    }
}

impl Slurm {
    /// Current canonical state of job `id`.
    ///
    /// Consults the live queue first and accounting second. Returns
    /// `Unknown` when every reachable source is silent about the job, and
    /// `ToolUnavailable` when no source could be reached at all.
    pub fn job_state(&self, id: u64) -> Result<JobState> {
        self.resolve_state(id, &StatusSource::FALLBACK_ORDER)
    }

    /// Resolve the state of job `id` by trying `sources` in order.
    pub fn resolve_state(&self, id: u64, sources: &[StatusSource]) -> Result<JobState> {
        let mut unavailable = Vec::new();

        for &source in sources {
            match self.lookup_state(source, id) {
                Ok(Some(state)) => {
                    tracing::debug!(job_id = id, ?source, %state, "Resolved job state");
                    return Ok(state);
                }
                Ok(None) => {
                    tracing::debug!(job_id = id, ?source, "No record for job");
                }
                Err(e) if e.is_unavailable() => {
                    tracing::debug!(job_id = id, ?source, "Status source unavailable, falling back");
                    unavailable.push(source.tool().name());
                }
                Err(e) => return Err(e),
            }
        }

        if !sources.is_empty() && unavailable.len() == sources.len() {
            return Err(SlurmError::ToolUnavailable(unavailable.join(", ")));
        }
        Ok(JobState::Unknown)
    }

    fn lookup_state(&self, source: StatusSource, id: u64) -> Result<Option<JobState>> {
        let filter = QueryFilter::new().job(id);
        let rows = match source {
            StatusSource::LiveQueue => self.squeue(&["state"], &filter)?,
            StatusSource::Accounting => self.sacct(&["state"], &filter.allocations())?,
        };

        Ok(rows
            .iter()
            .map(|row| normalize_state(row.get("state")))
            .find(|token| !token.is_empty())
            .map(|token| JobState::from_token(&token)))
    }
}
