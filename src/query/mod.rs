//! Per-tool query adapters.
//!
//! Each adapter knows one Slurm command: the table translating logical field
//! names into that command's format tokens, and how a [`QueryFilter`] maps
//! onto its flags. Output is always requested header-less and `|`-delimited
//! so every adapter shares the same table parser.

use chrono::NaiveDateTime;

use crate::client::Slurm;
use crate::error::{Result, SlurmError};
use crate::exec::{CommandExecutor, Tool};
use crate::parse::{parse_table, Row};

pub mod sacct;
pub mod sinfo;
pub mod sprio;
pub mod squeue;
pub mod sshare;

pub use sacct::Sacct;
pub use sinfo::Sinfo;
pub use sprio::Sprio;
pub use squeue::Squeue;
pub use sshare::Sshare;

const SEPARATOR: char = '|';
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Restrictions applied to a query. Each adapter honours the subset its
/// command supports and ignores the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFilter {
    pub jobs: Vec<u64>,
    pub users: Vec<String>,
    pub partitions: Vec<String>,
    pub states: Vec<String>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    /// Report every user's records (`sacct -a`, `sshare -a`).
    pub all_users: bool,
    /// Only job allocations, not job steps (`sacct -X`).
    pub allocations: bool,
    /// Include hidden and unavailable partitions (`sinfo -a`).
    pub all_partitions: bool,
    /// One line per node instead of per node group (`sinfo -N`).
    pub per_node: bool,
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job(mut self, id: u64) -> Self {
        self.jobs.push(id);
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.users.push(user.into());
        self
    }

    pub fn partition(mut self, partition: impl Into<String>) -> Self {
        self.partitions.push(partition.into());
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.states.push(state.into());
        self
    }

    pub fn since(mut self, start: NaiveDateTime) -> Self {
        self.start_time = Some(start);
        self
    }

    pub fn until(mut self, end: NaiveDateTime) -> Self {
        self.end_time = Some(end);
        self
    }

    pub fn all_users(mut self) -> Self {
        self.all_users = true;
        self
    }

    pub fn allocations(mut self) -> Self {
        self.allocations = true;
        self
    }

    pub fn all_partitions(mut self) -> Self {
        self.all_partitions = true;
        self
    }

    pub fn per_node(mut self) -> Self {
        self.per_node = true;
        self
    }
}

/// A Slurm command that can be queried for rows of named fields.
pub trait Source {
    const TOOL: Tool;

    /// Logical field name to the command's own column token.
    const FIELDS: &'static [(&'static str, &'static str)];

    /// Full argument vector for the given column tokens and filter.
    fn build_args(tokens: &[&'static str], filter: &QueryFilter) -> Vec<String>;

    fn field_token(field: &str) -> Option<&'static str> {
        Self::FIELDS
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, token)| *token)
    }

    fn field_names() -> Vec<&'static str> {
        Self::FIELDS.iter().map(|(name, _)| *name).collect()
    }
}

pub(crate) fn run_query<S: Source>(
    exec: &CommandExecutor,
    fields: &[&str],
    filter: &QueryFilter,
) -> Result<Vec<Row>> {
    let tokens = fields
        .iter()
        .map(|field| {
            S::field_token(field).ok_or_else(|| SlurmError::UnknownField {
                tool: S::TOOL.name().to_string(),
                field: field.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let args = S::build_args(&tokens, filter);
    let output = exec.run(S::TOOL, &args)?;
    if !output.success() {
        tracing::debug!(
            tool = %S::TOOL,
            exit_code = ?output.exit_code,
            stderr = output.stderr.trim(),
            "Query exited non-zero"
        );
    }

    let rows = parse_table(&output.stdout, fields, Some(SEPARATOR));
    tracing::debug!(tool = %S::TOOL, rows = rows.len(), "Query parsed");
    Ok(rows)
}

/// Push `flag value1,value2,...` when `values` is non-empty.
pub(crate) fn push_list<T: ToString>(args: &mut Vec<String>, flag: &str, values: &[T]) {
    if values.is_empty() {
        return;
    }
    args.push(flag.to_string());
    args.push(
        values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(","),
    );
}

pub(crate) fn push_time(args: &mut Vec<String>, flag: &str, time: Option<NaiveDateTime>) {
    if let Some(time) = time {
        args.push(flag.to_string());
        args.push(time.format(TIME_FORMAT).to_string());
    }
}

pub(crate) fn format_spec(tokens: &[&str]) -> String {
    tokens.join(&SEPARATOR.to_string())
}

impl Slurm {
    /// Query the live queue (`squeue`).
    pub fn squeue(&self, fields: &[&str], filter: &QueryFilter) -> Result<Vec<Row>> {
        run_query::<Squeue>(self.executor(), fields, filter)
    }

    /// Query historical accounting (`sacct`).
    pub fn sacct(&self, fields: &[&str], filter: &QueryFilter) -> Result<Vec<Row>> {
        run_query::<Sacct>(self.executor(), fields, filter)
    }

    /// Query partition and node capacity (`sinfo`).
    pub fn sinfo(&self, fields: &[&str], filter: &QueryFilter) -> Result<Vec<Row>> {
        run_query::<Sinfo>(self.executor(), fields, filter)
    }

    /// Query pending-job priority factors (`sprio`).
    pub fn sprio(&self, fields: &[&str], filter: &QueryFilter) -> Result<Vec<Row>> {
        run_query::<Sprio>(self.executor(), fields, filter)
    }

    /// Query fair-share accounting (`sshare`).
    pub fn sshare(&self, fields: &[&str], filter: &QueryFilter) -> Result<Vec<Row>> {
        run_query::<Sshare>(self.executor(), fields, filter)
    }
}
