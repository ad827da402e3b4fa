use std::collections::BTreeMap;

use crate::client::Slurm;
use crate::error::Result;
use crate::parse::{normalize_state, Row};
use crate::query::QueryFilter;

/// Node totals per normalized, upper-cased state from per-node `sinfo -N`
/// rows with nodelist and state fields.
///
/// `sinfo -N` still repeats a node once for every partition it belongs to;
/// only the first line for each node name is counted.
pub fn node_counts_from_rows(rows: &[Row]) -> BTreeMap<String, u64> {
    let mut nodes: BTreeMap<&str, String> = BTreeMap::new();
    for row in rows {
        let name = row.get("nodelist");
        let state = normalize_state(row.get("state")).to_ascii_uppercase();
        if name.is_empty() || state.is_empty() {
            continue;
        }
        nodes.entry(name).or_insert(state);
    }

    let mut counts = BTreeMap::new();
    for state in nodes.into_values() {
        *counts.entry(state).or_default() += 1;
    }
    counts
}

impl Slurm {
    /// Number of nodes in each state, e.g. `IDLE`, `MIXED`, `DRAIN`.
    /// Hidden partitions are included, as for partition capacity.
    pub fn node_state_counts(&self) -> Result<BTreeMap<String, u64>> {
        let filter = QueryFilter::new().all_partitions().per_node();
        let rows = self.sinfo(&["nodelist", "state"], &filter)?;
        Ok(node_counts_from_rows(&rows))
    }
}
