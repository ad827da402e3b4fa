use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::client::Slurm;
use crate::error::{Result, SlurmError};
use crate::parse::parse_datetime;
use crate::query::QueryFilter;

/// Bucket width for completion history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Span {
    Day,
    Week,
}

impl Span {
    pub fn days(self) -> i64 {
        match self {
            Span::Day => 1,
            Span::Week => 7,
        }
    }

    /// Bucket label: `YYYY-MM-DD` for days, ISO `YYYY-Www` for weeks.
    pub fn label(self, at: NaiveDateTime) -> String {
        match self {
            Span::Day => at.format("%Y-%m-%d").to_string(),
            Span::Week => {
                let week = at.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Span::Day => write!(f, "day"),
            Span::Week => write!(f, "week"),
        }
    }
}

impl FromStr for Span {
    type Err = SlurmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(Span::Day),
            "week" => Ok(Span::Week),
            other => Err(SlurmError::InvalidArgument(format!(
                "span must be 'day' or 'week', got '{other}'"
            ))),
        }
    }
}

/// Completed-job count for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionBucket {
    pub period: String,
    pub count: u64,
}

/// Group end times into `span` buckets, oldest first, keeping only the
/// newest `count` buckets. Periods with no completions are absent.
pub fn bucket_completions<I>(ends: I, span: Span, count: usize) -> Vec<CompletionBucket>
where
    I: IntoIterator<Item = NaiveDateTime>,
{
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for end in ends {
        *counts.entry(span.label(end)).or_default() += 1;
    }

    let buckets: Vec<CompletionBucket> = counts
        .into_iter()
        .map(|(period, count)| CompletionBucket { period, count })
        .collect();
    let skip = buckets.len().saturating_sub(count);
    buckets.into_iter().skip(skip).collect()
}

/// Midnight at the start of the window covering `count` spans before `now`.
pub fn window_start(now: NaiveDateTime, span: Span, count: usize) -> NaiveDateTime {
    let back = TimeDelta::days(span.days() * count as i64);
    (now - back).date().and_time(chrono::NaiveTime::MIN)
}

impl Slurm {
    /// The calling user's completed jobs per day or week over the last
    /// `count` periods.
    pub fn recent_completions(&self, span: Span, count: usize) -> Result<Vec<CompletionBucket>> {
        self.completions_before(Local::now().naive_local(), span, count)
    }

    /// [`recent_completions`](Self::recent_completions) with an explicit
    /// reference time.
    pub fn completions_before(
        &self,
        now: NaiveDateTime,
        span: Span,
        count: usize,
    ) -> Result<Vec<CompletionBucket>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let filter = QueryFilter::new()
            .state("CD")
            .since(window_start(now, span, count))
            .allocations();
        let rows = self.sacct(&["end"], &filter)?;
        let ends = rows.iter().filter_map(|row| parse_datetime(row.get("end")));

        Ok(bucket_completions(ends, span, count))
    }
}
