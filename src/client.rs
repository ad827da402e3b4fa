use crate::config::ToolConfig;
use crate::exec::{CommandExecutor, Tool};

/// Entry point to a Slurm cluster reachable through its command-line tools.
///
/// Query adapters, job resolution and the aggregations are implemented as
/// methods on this type in their own modules. It holds no cluster state:
/// every call runs the relevant commands afresh.
#[derive(Debug, Clone, Default)]
pub struct Slurm {
    executor: CommandExecutor,
}

impl Slurm {
    pub fn new(config: ToolConfig) -> Self {
        Self {
            executor: CommandExecutor::new(config),
        }
    }

    pub fn executor(&self) -> &CommandExecutor {
        &self.executor
    }

    pub fn config(&self) -> &ToolConfig {
        self.executor.config()
    }

    pub fn is_available(&self, tool: Tool) -> bool {
        self.executor.is_available(tool)
    }
}
