use serde::{Deserialize, Serialize};

use crate::parse::normalize_state;

/// Canonical job lifecycle state.
///
/// Terminal and active states are disjoint. `Unknown` is neither: it means
/// no source reported a state the crate recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Pending,
    Configuring,
    Running,
    Completing,
    StageOut,
    Suspended,
    ResvDelHold,
    Completed,
    Failed,
    Cancelled,
    Timeout,
    Preempted,
    BootFail,
    NodeFail,
    Unknown,
}

impl JobState {
    pub const TERMINAL: [JobState; 7] = [
        JobState::Completed,
        JobState::Failed,
        JobState::Cancelled,
        JobState::Timeout,
        JobState::Preempted,
        JobState::BootFail,
        JobState::NodeFail,
    ];

    pub const ACTIVE: [JobState; 7] = [
        JobState::Pending,
        JobState::Configuring,
        JobState::Running,
        JobState::Completing,
        JobState::StageOut,
        JobState::Suspended,
        JobState::ResvDelHold,
    ];

    /// Map an already normalized token to its state. Accepts long names and
    /// Slurm's compact codes, case-insensitively.
    pub fn from_token(token: &str) -> JobState {
        match token.to_ascii_uppercase().as_str() {
            "PENDING" | "PD" => JobState::Pending,
            "CONFIGURING" | "CF" => JobState::Configuring,
            "RUNNING" | "R" => JobState::Running,
            "COMPLETING" | "CG" => JobState::Completing,
            "STAGE_OUT" | "SO" => JobState::StageOut,
            "SUSPENDED" | "S" => JobState::Suspended,
            "RESV_DEL_HOLD" | "RD" => JobState::ResvDelHold,
            "COMPLETED" | "CD" => JobState::Completed,
            "FAILED" | "F" | "OUT_OF_MEMORY" | "OOM" => JobState::Failed,
            "CANCELLED" | "CA" => JobState::Cancelled,
            "TIMEOUT" | "TO" | "DEADLINE" | "DL" => JobState::Timeout,
            "PREEMPTED" | "PR" => JobState::Preempted,
            "BOOT_FAIL" | "BF" => JobState::BootFail,
            "NODE_FAIL" | "NF" => JobState::NodeFail,
            _ => JobState::Unknown,
        }
    }

    /// Normalize a raw token as printed by a tool, then map it.
    pub fn from_raw(raw: &str) -> JobState {
        JobState::from_token(&normalize_state(raw))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Pending => "PENDING",
            JobState::Configuring => "CONFIGURING",
            JobState::Running => "RUNNING",
            JobState::Completing => "COMPLETING",
            JobState::StageOut => "STAGE_OUT",
            JobState::Suspended => "SUSPENDED",
            JobState::ResvDelHold => "RESV_DEL_HOLD",
            JobState::Completed => "COMPLETED",
            JobState::Failed => "FAILED",
            JobState::Cancelled => "CANCELLED",
            JobState::Timeout => "TIMEOUT",
            JobState::Preempted => "PREEMPTED",
            JobState::BootFail => "BOOT_FAIL",
            JobState::NodeFail => "NODE_FAIL",
            JobState::Unknown => "UNKNOWN",
        }
    }

    /// The job has finished and will not change state again.
    pub fn is_terminal(self) -> bool {
        Self::TERMINAL.contains(&self)
    }

    /// The job is queued or still holds resources.
    pub fn is_active(self) -> bool {
        Self::ACTIVE.contains(&self)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(JobState::from_raw(s))
    }
}
