use serde::Serialize;

/// The Slurm commands this crate knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Squeue,
    Sacct,
    Sinfo,
    Sprio,
    Sshare,
    Sbatch,
    Scancel,
    Scontrol,
}

impl Tool {
    /// Stock command name.
    pub fn name(self) -> &'static str {
        match self {
            Tool::Squeue => "squeue",
            Tool::Sacct => "sacct",
            Tool::Sinfo => "sinfo",
            Tool::Sprio => "sprio",
            Tool::Sshare => "sshare",
            Tool::Sbatch => "sbatch",
            Tool::Scancel => "scancel",
            Tool::Scontrol => "scontrol",
        }
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
