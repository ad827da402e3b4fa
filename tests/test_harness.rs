//! Test harness for driving the client against fake Slurm commands.
//!
//! Each fake is a `/bin/sh` script in a private temporary directory. Every
//! invocation appends `<tool> <args...>` to `calls.log` before running the
//! script body, so tests can assert on the exact command lines issued.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use nanoslurm::{Slurm, ToolConfig};
use tempfile::TempDir;

pub const TEST_USER: &str = "tester";

pub struct FakeCluster {
    dir: TempDir,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    fn calls_file(&self) -> PathBuf {
        self.path().join("calls.log")
    }

    /// Install `tool` as a script running `body` after logging its arguments.
    pub fn install(&self, tool: &str, body: &str) -> &Self {
        let path = self.path().join(tool);
        let script = format!(
            "#!/bin/sh\necho \"{tool} $*\" >> '{log}'\n{body}\n",
            log = self.calls_file().display()
        );
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        self
    }

    /// Install `tool` printing `output` verbatim and exiting 0.
    pub fn install_output(&self, tool: &str, output: &str) -> &Self {
        let data = self.path().join(format!("{tool}.out"));
        fs::write(&data, output).unwrap();
        self.install(tool, &format!("cat '{}'", data.display()))
    }

    /// A script body that prints `first` for the first `n` calls and
    /// `after` from then on. The call count is kept in `counter`.
    pub fn sequence_body(&self, counter: &str, n: u32, first: &str, after: &str) -> String {
        let file = self.path().join(counter);
        format!(
            "c=$(cat '{f}' 2>/dev/null || echo 0)\nc=$((c+1))\necho $c > '{f}'\nif [ $c -le {n} ]; then printf '{first}'; else printf '{after}'; fi",
            f = file.display()
        )
    }

    /// Command lines issued so far, oldest first.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.calls_file())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn calls_to(&self, tool: &str) -> Vec<String> {
        let prefix = format!("{tool} ");
        self.calls()
            .into_iter()
            .filter(|line| line.starts_with(&prefix) || line == tool)
            .collect()
    }

    pub fn config(&self) -> ToolConfig {
        ToolConfig::new()
            .with_search_dir(self.path())
            .with_user(TEST_USER)
    }

    pub fn slurm(&self) -> Slurm {
        Slurm::new(self.config())
    }
}
