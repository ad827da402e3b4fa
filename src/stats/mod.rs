//! Cluster-wide aggregations.
//!
//! - [`capacity`]: installed and in-use CPUs/GPUs, utilization per partition
//! - [`fairshare`]: per-user fair-share scores with source fallback
//! - [`history`]: completed-job histogram by day or ISO week
//! - [`nodes`]: node counts per state
//! - [`counts`]: statistics over a job listing
//!
//! The cluster-facing aggregations are methods on [`Slurm`](crate::Slurm);
//! the arithmetic behind each is a pure function over parsed rows.

pub mod capacity;
pub mod counts;
pub mod fairshare;
pub mod history;
pub mod nodes;

pub use capacity::{utilization, utilization_percent, Resources};
pub use counts::{PartitionSummary, Share, UserActivity};
pub use history::{CompletionBucket, Span};
