use crate::client::Slurm;
use crate::error::{Result, SlurmError};
use crate::exec::Tool;
use crate::jobs::{Job, JobState};
use crate::parse::{parse_datetime, Row};
use crate::query::QueryFilter;

const LIST_FIELDS: &[&str] = &["id", "name", "user", "partition", "state", "submit", "start"];

impl Slurm {
    /// Jobs known to the scheduler, optionally restricted to one user.
    ///
    /// Uses `squeue` when present and `sacct` otherwise. The two are never
    /// merged: mid-transition they can disagree about the same job.
    pub fn list_jobs(&self, user: Option<&str>) -> Result<Vec<Job>> {
        let mut filter = QueryFilter::new();
        if let Some(user) = user {
            filter = filter.user(user);
        }

        let rows = if self.is_available(Tool::Squeue) {
            self.squeue(LIST_FIELDS, &filter)?
        } else if self.is_available(Tool::Sacct) {
            tracing::debug!("squeue unavailable, listing jobs from sacct");
            self.sacct(LIST_FIELDS, &filter.allocations())?
        } else {
            return Err(SlurmError::ToolUnavailable("squeue, sacct".to_string()));
        };

        Ok(rows.iter().filter_map(job_from_row).collect())
    }
}

fn job_from_row(row: &Row) -> Option<Job> {
    let id = row.get("id").parse().ok()?;
    Some(
        Job::new(id, row.get("name"), row.get("user"), row.get("partition"))
            .with_times(parse_datetime(row.get("submit")), parse_datetime(row.get("start")))
            .with_state(JobState::from_raw(row.get("state"))),
    )
}
