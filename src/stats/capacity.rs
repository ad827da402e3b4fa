use std::collections::BTreeMap;

use serde::Serialize;

use crate::client::Slurm;
use crate::error::Result;
use crate::parse::{parse_gpu_count, Row};
use crate::query::QueryFilter;

const CAPACITY_FIELDS: &[&str] = &["partition", "cpus", "gres", "nodes"];

/// CPU and GPU counts, either installed in a partition or in use there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Resources {
    pub cpus: u64,
    pub gpus: u64,
}

impl std::ops::AddAssign for Resources {
    fn add_assign(&mut self, other: Self) {
        self.cpus += other.cpus;
        self.gpus += other.gpus;
    }
}

/// Per-partition totals from `sinfo` rows with partition, cpus (`A/I/O/T`),
/// gres and nodes fields.
pub fn capacity_from_rows(rows: &[Row]) -> BTreeMap<String, Resources> {
    let mut caps: BTreeMap<String, Resources> = BTreeMap::new();
    for row in rows {
        let partition = row.get("partition").trim_end_matches('*');
        if partition.is_empty() {
            continue;
        }
        let cpus = row
            .get("cpus")
            .rsplit('/')
            .next()
            .and_then(|total| total.trim().parse().ok())
            .unwrap_or(0);
        let gpus = parse_gpu_count(row.get("gres")) * node_count(row);

        *caps.entry(partition.to_string()).or_default() += Resources { cpus, gpus };
    }
    caps
}

/// Per-partition resources held by the given `squeue` rows.
pub fn usage_from_rows(rows: &[Row]) -> BTreeMap<String, Resources> {
    let mut usage: BTreeMap<String, Resources> = BTreeMap::new();
    for row in rows {
        let cpus = row.get("cpus").trim().parse().unwrap_or(0);
        let gpus = parse_gpu_count(row.get("gres")) * node_count(row);
        *usage.entry(row.get("partition").to_string()).or_default() += Resources { cpus, gpus };
    }
    usage
}

/// Utilization as the busier of the CPU and GPU ratios, in percent. A zero
/// total contributes a ratio of zero.
pub fn utilization_percent(capacity: Resources, used: Resources) -> f64 {
    fn ratio(used: u64, total: u64) -> f64 {
        if total == 0 {
            0.0
        } else {
            used as f64 / total as f64
        }
    }
    ratio(used.cpus, capacity.cpus).max(ratio(used.gpus, capacity.gpus)) * 100.0
}

/// Utilization for every partition in `capacity`.
pub fn utilization(
    capacity: &BTreeMap<String, Resources>,
    usage: &BTreeMap<String, Resources>,
) -> BTreeMap<String, f64> {
    capacity
        .iter()
        .map(|(partition, cap)| {
            let used = usage.get(partition).copied().unwrap_or_default();
            (partition.clone(), utilization_percent(*cap, used))
        })
        .collect()
}

fn node_count(row: &Row) -> u64 {
    row.get("nodes").trim().parse().unwrap_or(1)
}

impl Slurm {
    /// Installed CPUs and GPUs per partition.
    pub fn partition_capacity(&self) -> Result<BTreeMap<String, Resources>> {
        let rows = self.sinfo(CAPACITY_FIELDS, &QueryFilter::new().all_partitions())?;
        Ok(capacity_from_rows(&rows))
    }

    /// CPUs and GPUs held by running jobs, per partition.
    pub fn running_usage(&self) -> Result<BTreeMap<String, Resources>> {
        let rows = self.squeue(CAPACITY_FIELDS, &QueryFilter::new().state("RUNNING"))?;
        Ok(usage_from_rows(&rows))
    }

    /// Percentage utilization per partition.
    pub fn partition_utilization(&self) -> Result<BTreeMap<String, f64>> {
        let capacity = self.partition_capacity()?;
        let usage = self.running_usage()?;
        Ok(utilization(&capacity, &usage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs.iter().copied().collect()
    }

    #[test]
    fn gpu_total_is_per_node_times_nodes() {
        let caps = capacity_from_rows(&[row(&[
            ("partition", "p1"),
            ("cpus", "32/32/0/64"),
            ("gres", "gpu:4"),
            ("nodes", "4"),
        ])]);
        assert_eq!(caps["p1"], Resources { cpus: 64, gpus: 16 });
    }

    #[test]
    fn strips_default_marker_and_sums_node_groups() {
        let caps = capacity_from_rows(&[
            row(&[("partition", "gpu*"), ("cpus", "0/64/0/64"), ("gres", "gpu:a100:8"), ("nodes", "2")]),
            row(&[("partition", "gpu"), ("cpus", "0/32/0/32"), ("gres", "gpu:v100:4"), ("nodes", "1")]),
            row(&[("partition", "cpu"), ("cpus", "n/a"), ("gres", "(null)"), ("nodes", "10")]),
        ]);
        assert_eq!(caps["gpu"], Resources { cpus: 96, gpus: 20 });
        assert_eq!(caps["cpu"], Resources { cpus: 0, gpus: 0 });
    }

    #[test]
    fn usage_sums_running_jobs() {
        let usage = usage_from_rows(&[
            row(&[("partition", "gpu"), ("cpus", "16"), ("gres", "gres/gpu:4"), ("nodes", "1")]),
            row(&[("partition", "gpu"), ("cpus", "16"), ("gres", "gres/gpu:2"), ("nodes", "2")]),
            row(&[("partition", "cpu"), ("cpus", "4"), ("gres", "N/A"), ("nodes", "1")]),
        ]);
        assert_eq!(usage["gpu"], Resources { cpus: 32, gpus: 8 });
        assert_eq!(usage["cpu"], Resources { cpus: 4, gpus: 0 });
    }

    #[test]
    fn utilization_takes_busier_resource() {
        let pct = utilization_percent(Resources { cpus: 64, gpus: 8 }, Resources { cpus: 32, gpus: 8 });
        assert_eq!(pct, 100.0);

        let pct = utilization_percent(Resources { cpus: 64, gpus: 8 }, Resources { cpus: 16, gpus: 0 });
        assert_eq!(pct, 25.0);
    }

    #[test]
    fn zero_capacity_is_zero_percent() {
        let pct = utilization_percent(Resources::default(), Resources { cpus: 4, gpus: 1 });
        assert_eq!(pct, 0.0);
    }

    #[test]
    fn idle_partitions_report_zero() {
        let mut caps = BTreeMap::new();
        caps.insert("idle".to_string(), Resources { cpus: 8, gpus: 0 });
        let util = utilization(&caps, &BTreeMap::new());
        assert_eq!(util["idle"], 0.0);
    }
}
