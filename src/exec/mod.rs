//! External command plumbing.
//!
//! Everything this crate learns about the cluster comes from running Slurm
//! commands. This module owns that boundary:
//! - **Tool lookup**: resolves a command on the configured search path
//! - **Execution**: spawns the command and captures stdout/stderr
//!
//! # Components
//!
//! - [`Tool`]: the Slurm commands the crate drives
//! - [`CommandExecutor`]: availability checks and blocking execution
//! - [`which`]: search-path lookup used by the executor
//!
//! All calls block the current thread until the child exits. There is no
//! timeout on a child process; a hung tool blocks its caller.

pub mod executor;
pub mod tool;
pub mod which;

pub use executor::{CommandExecutor, CommandOutput, ExitPolicy};
pub use tool::Tool;
