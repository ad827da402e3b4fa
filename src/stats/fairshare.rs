use std::collections::BTreeMap;

use crate::client::Slurm;
use crate::error::Result;
use crate::exec::Tool;
use crate::parse::Row;
use crate::query::QueryFilter;

const FAIRSHARE_FIELDS: &[&str] = &["user", "fairshare"];

/// Sources of per-user fair-share scores, in order of preference.
const FAIRSHARE_SOURCES: [Tool; 2] = [Tool::Sprio, Tool::Sshare];

/// Per-user scores from rows with user and fairshare fields. Rows without a
/// user (account totals) or with an unparsable score are skipped; a later
/// row for the same user wins.
pub fn scores_from_rows(rows: &[Row]) -> BTreeMap<String, f64> {
    rows.iter()
        .filter(|row| !row.get("user").is_empty())
        .filter_map(|row| {
            let score = row.get("fairshare").parse::<f64>().ok()?;
            Some((row.get("user").to_string(), score))
        })
        .collect()
}

impl Slurm {
    /// Fair-share score per user, best effort.
    ///
    /// The first available source answers; when none is installed the
    /// result is empty rather than an error.
    pub fn fairshare_scores(&self) -> Result<BTreeMap<String, f64>> {
        for tool in FAIRSHARE_SOURCES {
            let result = match tool {
                Tool::Sprio => self.sprio(FAIRSHARE_FIELDS, &QueryFilter::new()),
                _ => self.sshare(FAIRSHARE_FIELDS, &QueryFilter::new().all_users()),
            };
            match result {
                Ok(rows) => return Ok(scores_from_rows(&rows)),
                Err(e) if e.is_unavailable() => {
                    tracing::debug!(tool = %tool, "Fair-share source unavailable");
                }
                Err(e) => return Err(e),
            }
        }

        tracing::warn!("No fair-share source available");
        Ok(BTreeMap::new())
    }
}
