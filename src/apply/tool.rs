// src/apply/tool.rs

//! Patch tool invocation
//!
//! The textual patch-apply mechanism is an external subprocess with the
//! contract `<tool> -p<precision> <filepath>`. [`PatchRunner`] abstracts
//! the invocation so the orchestrator can be driven by in-memory fakes;
//! [`CommandRunner`] is the production implementation, defaulting to
//! `git apply`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

use crate::error::{Error, Result};
use crate::manifest::Patch;

/// Default patch tool command
pub const DEFAULT_TOOL: &str = "git apply";

/// Result of one patch tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Whether the tool exited with status 0
    pub success: bool,

    /// The tool's exit code, if it exited normally
    pub exit_code: Option<i32>,

    /// Captured output: stdout lines followed by stderr lines
    pub lines: Vec<String>,
}

/// Invokes the patch tool for one patch
pub trait PatchRunner {
    /// Apply the patch inside `workdir`, capturing output and exit status
    fn run(&self, patch: &Patch, workdir: &Path) -> Result<ApplyOutcome>;
}

/// Subprocess-backed patch runner
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: PathBuf,
    leading_args: Vec<String>,
}

impl CommandRunner {
    /// Build a runner from a tool command line such as `git apply`
    ///
    /// The first word must resolve to an executable on PATH; a missing tool
    /// is a configuration error, there is no fallback.
    pub fn new(command: &str) -> Result<Self> {
        let mut words = command.split_whitespace();
        let tool = words
            .next()
            .ok_or_else(|| Error::ToolNotFound(command.to_string()))?;

        let program =
            which::which(tool).map_err(|_| Error::ToolNotFound(tool.to_string()))?;

        Ok(Self {
            program,
            leading_args: words.map(|w| w.to_string()).collect(),
        })
    }

    /// Build a runner from an explicit program path and leading arguments
    pub fn with_args(program: impl Into<PathBuf>, leading_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            leading_args,
        }
    }
}

impl PatchRunner for CommandRunner {
    fn run(&self, patch: &Patch, workdir: &Path) -> Result<ApplyOutcome> {
        // Absolute patch path, so it resolves regardless of workdir
        let file_path = fs::canonicalize(patch.file_path())?;

        debug!(
            "Running {} {:?} -p{} {} (cwd {})",
            self.program.display(),
            self.leading_args,
            patch.precision(),
            file_path.display(),
            workdir.display()
        );

        let output = Command::new(&self.program)
            .args(&self.leading_args)
            .arg(format!("-p{}", patch.precision()))
            .arg(&file_path)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .output()?;

        let mut lines: Vec<String> = Vec::new();
        lines.extend(
            String::from_utf8_lossy(&output.stdout)
                .lines()
                .map(|l| l.to_string()),
        );
        lines.extend(
            String::from_utf8_lossy(&output.stderr)
                .lines()
                .map(|l| l.to_string()),
        );

        Ok(ApplyOutcome {
            success: output.status.success(),
            exit_code: output.status.code(),
            lines,
        })
    }
}
