//! Aggregations over a job listing, as shown by the monitor's statistics
//! views. These are pure functions of the jobs passed in.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::jobs::{Job, JobState};

const UNKNOWN_USER: &str = "(unknown)";
const NO_PARTITION: &str = "(none)";

/// A labelled count with its share of the total, in percent rounded to one
/// decimal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub label: String,
    pub count: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserActivity {
    pub total: u64,
    pub running: u64,
    pub pending: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartitionSummary {
    pub running: u64,
    pub pending: u64,
    pub other: u64,
    pub users: BTreeSet<String>,
}

impl PartitionSummary {
    pub fn total(&self) -> u64 {
        self.running + self.pending + self.other
    }
}

fn state_of(job: &Job) -> JobState {
    job.last_state().unwrap_or(JobState::Unknown)
}

fn user_label(job: &Job) -> &str {
    if job.user.is_empty() {
        UNKNOWN_USER
    } else {
        &job.user
    }
}

fn partition_label(job: &Job) -> &str {
    if job.partition.is_empty() {
        NO_PARTITION
    } else {
        &job.partition
    }
}

fn percent(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 * 1000.0 / total as f64).round() / 10.0
}

fn shares(counts: BTreeMap<&str, u64>, total: u64) -> Vec<Share> {
    counts
        .into_iter()
        .map(|(label, count)| Share {
            label: label.to_string(),
            count,
            percent: percent(count, total),
        })
        .collect()
}

fn tally<'a>(jobs: &'a [Job], key: impl Fn(&'a Job) -> &'a str) -> BTreeMap<&'a str, u64> {
    let mut counts = BTreeMap::new();
    for job in jobs {
        *counts.entry(key(job)).or_default() += 1;
    }
    counts
}

/// Largest count first, ties by label.
fn by_count_desc(mut shares: Vec<Share>) -> Vec<Share> {
    shares.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    shares
}

/// Jobs per state, ordered by state name.
pub fn job_state_counts(jobs: &[Job]) -> Vec<Share> {
    let counts = tally(jobs, |job| state_of(job).as_str());
    shares(counts, jobs.len() as u64)
}

/// The `limit` users with the most jobs.
pub fn top_users(jobs: &[Job], limit: usize) -> Vec<Share> {
    let counts = tally(jobs, user_label);
    let mut ranked = by_count_desc(shares(counts, jobs.len() as u64));
    ranked.truncate(limit);
    ranked
}

/// Jobs per partition, busiest first.
pub fn partition_counts(jobs: &[Job]) -> Vec<Share> {
    let counts = tally(jobs, partition_label);
    by_count_desc(shares(counts, jobs.len() as u64))
}

pub fn user_activity(jobs: &[Job]) -> BTreeMap<String, UserActivity> {
    let mut activity: BTreeMap<String, UserActivity> = BTreeMap::new();
    for job in jobs {
        let entry = activity.entry(user_label(job).to_string()).or_default();
        entry.total += 1;
        match state_of(job) {
            JobState::Running => entry.running += 1,
            JobState::Pending => entry.pending += 1,
            _ => {}
        }
    }
    activity
}

pub fn partition_summaries(jobs: &[Job]) -> BTreeMap<String, PartitionSummary> {
    let mut summaries: BTreeMap<String, PartitionSummary> = BTreeMap::new();
    for job in jobs {
        let entry = summaries
            .entry(partition_label(job).to_string())
            .or_default();
        match state_of(job) {
            JobState::Running => entry.running += 1,
            JobState::Pending => entry.pending += 1,
            _ => entry.other += 1,
        }
        if !job.user.is_empty() {
            entry.users.insert(job.user.clone());
        }
    }
    summaries
}
