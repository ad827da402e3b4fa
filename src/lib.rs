pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod exec;
pub mod jobs;
pub mod parse;
pub mod query;
pub mod shutdown;
pub mod stats;

pub use client::Slurm;
pub use config::{DashboardConfig, ToolConfig};
pub use error::{Result, SlurmError};
pub use exec::Tool;
pub use jobs::{Job, JobCommand, JobHandle, JobState, StatusSource, SubmitRequest};
pub use query::QueryFilter;
pub use stats::Span;
