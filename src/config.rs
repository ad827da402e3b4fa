use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::exec::Tool;

/// Where and how the Slurm commands are found.
///
/// The default looks every tool up by its stock name on `PATH`. Tests and
/// sites with wrapper scripts point `search_path` at a private directory or
/// override individual command names.
#[derive(Debug, Clone, Default)]
pub struct ToolConfig {
    /// Directories searched for commands, in order. `None` means `PATH`.
    pub search_path: Option<Vec<PathBuf>>,
    /// Per-tool command names or absolute paths.
    pub commands: HashMap<Tool, String>,
    /// User recorded on submitted jobs. Falls back to `$USER`.
    pub user: Option<String>,
}

impl ToolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_path.get_or_insert_with(Vec::new).push(dir.into());
        self
    }

    pub fn with_command(mut self, tool: Tool, command: impl Into<String>) -> Self {
        self.commands.insert(tool, command.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Command name (or path) used to invoke `tool`.
    pub fn command_name(&self, tool: Tool) -> &str {
        self.commands
            .get(&tool)
            .map(String::as_str)
            .unwrap_or_else(|| tool.name())
    }

    pub fn current_user(&self) -> String {
        self.user
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_default()
    }
}

/// Configuration for the HTTP monitor dashboard.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub listen_addr: SocketAddr,
    /// Page refresh period used by the bundled HTML view.
    pub refresh_interval_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            refresh_interval_ms: 5000,
        }
    }
}

impl DashboardConfig {
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            ..Default::default()
        }
    }
}
