// src/apply/mod.rs

//! Patch installation orchestration
//!
//! Applies an already-resolved list of patches, strictly in order, against
//! pristine package contents. Key guarantees:
//!
//! - **Reinstall-before-first-patch**: each distinct target package is
//!   removed and re-materialized exactly once per run, before its first
//!   patch, so every patch lands on un-patched content
//! - **Fail-fast**: a non-zero patch tool exit aborts the whole run; nothing
//!   after the failing patch is attempted and nothing is rolled back
//! - **Run-scoped state**: the reinstalled-package set lives on the applier
//!   instance, so separate runs never leak into each other
//!
//! # Run lifecycle
//!
//! ```text
//! Idle -> Reinstalling(package) -> Patching(patch) -> { Patching(next) | Aborted | Done }
//! ```
//!
//! `Aborted` and `Done` are terminal; there is no retry within a run.

mod tool;

pub use tool::{ApplyOutcome, CommandRunner, PatchRunner, DEFAULT_TOOL};

use std::collections::HashSet;
use tracing::debug;

use crate::error::{Error, Result};
use crate::lifecycle::PackageLifecycle;
use crate::manifest::Patch;
use crate::report::Reporter;
use crate::state::InstallState;

const SEPARATOR_WIDTH: usize = 72;

/// Summary of a completed apply run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Patches applied successfully
    pub patches_applied: usize,

    /// Distinct packages reinstalled before patching
    pub packages_reinstalled: usize,
}

/// Applies resolved patches against the installed package tree
pub struct PatchApplier<'a> {
    state: &'a InstallState,
    lifecycle: &'a dyn PackageLifecycle,
    runner: &'a dyn PatchRunner,
    reporter: &'a dyn Reporter,
    reinstalled: HashSet<String>,
}

impl<'a> PatchApplier<'a> {
    pub fn new(
        state: &'a InstallState,
        lifecycle: &'a dyn PackageLifecycle,
        runner: &'a dyn PatchRunner,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            state,
            lifecycle,
            runner,
            reporter,
            reinstalled: HashSet::new(),
        }
    }

    /// Apply the patches strictly in the given order
    ///
    /// An empty list is a successful no-op. The first failure aborts the
    /// run; packages already reinstalled or patched are left as-is.
    pub fn apply(&mut self, patches: &[Patch]) -> Result<ApplyReport> {
        if patches.is_empty() {
            self.reporter.info("No applicable patches");
            return Ok(ApplyReport::default());
        }

        self.reporter.comment(&"-".repeat(SEPARATOR_WIDTH));
        self.reporter
            .info(&format!("Applying {} applicable patches", patches.len()));

        let mut applied = 0;
        for patch in patches {
            self.apply_one(patch)?;
            applied += 1;
            self.reporter.comment(&"-".repeat(SEPARATOR_WIDTH));
        }

        Ok(ApplyReport {
            patches_applied: applied,
            packages_reinstalled: self.reinstalled.len(),
        })
    }

    fn apply_one(&mut self, patch: &Patch) -> Result<()> {
        // The resolver already proved the target exists; absence here means
        // the state changed under us and the run must stop
        let package = self
            .state
            .package(patch.target_name())
            .ok_or_else(|| Error::StateDesync(patch.target_name().to_string()))?;

        if !self.reinstalled.contains(&package.name) {
            self.reporter.info(&format!(
                "  - Reinstalling {} ({}) for patching",
                package.name, package.version
            ));
            let path = self.lifecycle.install_path(package);
            self.lifecycle.remove(package, &path)?;
            self.lifecycle.download(package, &path)?;
            self.reinstalled.insert(package.name.clone());
        }

        debug!(
            "Applying patch '{}' to {} with -p{}",
            patch.name(),
            package.name,
            patch.precision()
        );
        let workdir = self.lifecycle.install_path(package);
        let outcome = self.runner.run(patch, &workdir)?;

        if !outcome.success {
            self.reporter
                .error(&format!("Unable to apply \"{}\"", patch.name()));
            for line in &outcome.lines {
                self.reporter.error(line);
            }
            return Err(Error::ApplyFailed(patch.name().to_string()));
        }

        self.reporter.info(&format!(
            "  - Patched {} ({}): {} {}",
            package.name,
            package.display_version(),
            patch.name(),
            patch.description()
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Level, MemoryReporter};
    use crate::state::InstalledPackage;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// Records lifecycle calls instead of touching the filesystem
    #[derive(Default)]
    struct FakeLifecycle {
        calls: Mutex<Vec<String>>,
    }

    impl FakeLifecycle {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl PackageLifecycle for FakeLifecycle {
        fn install_path(&self, package: &InstalledPackage) -> PathBuf {
            PathBuf::from("/vendor").join(&package.name)
        }

        fn remove(&self, package: &InstalledPackage, _path: &Path) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("remove {}", package.name));
            Ok(())
        }

        fn download(&self, package: &InstalledPackage, _path: &Path) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("download {}", package.name));
            Ok(())
        }
    }

    /// Succeeds for every patch except the named ones
    #[derive(Default)]
    struct FakeRunner {
        failing: Vec<String>,
        runs: Mutex<Vec<String>>,
    }

    impl FakeRunner {
        fn failing(names: &[&str]) -> Self {
            Self {
                failing: names.iter().map(|s| s.to_string()).collect(),
                runs: Mutex::default(),
            }
        }

        fn runs(&self) -> Vec<String> {
            self.runs.lock().unwrap().clone()
        }
    }

    impl PatchRunner for FakeRunner {
        fn run(&self, patch: &Patch, _workdir: &Path) -> Result<ApplyOutcome> {
            self.runs.lock().unwrap().push(patch.name().to_string());
            if self.failing.contains(&patch.name().to_string()) {
                Ok(ApplyOutcome {
                    success: false,
                    exit_code: Some(1),
                    lines: vec!["error: corrupt patch".to_string()],
                })
            } else {
                Ok(ApplyOutcome {
                    success: true,
                    exit_code: Some(0),
                    lines: Vec::new(),
                })
            }
        }
    }

    fn patch(name: &str, target: &str) -> Patch {
        Patch::new(name, format!("{name} description"), target, vec![], "a.diff", 1).unwrap()
    }

    fn state(packages: &[(&str, &str)]) -> InstallState {
        let mut state = InstallState::new();
        for (name, version) in packages {
            state.insert(InstalledPackage {
                name: name.to_string(),
                version: version.to_string(),
                pretty_version: Some(format!("v{version}")),
                dist: None,
            });
        }
        state
    }

    #[test]
    fn test_empty_list_is_a_successful_noop() {
        let state = state(&[]);
        let lifecycle = FakeLifecycle::default();
        let runner = FakeRunner::default();
        let reporter = MemoryReporter::new();

        let mut applier = PatchApplier::new(&state, &lifecycle, &runner, &reporter);
        let report = applier.apply(&[]).unwrap();

        assert_eq!(report, ApplyReport::default());
        assert!(lifecycle.calls().is_empty());
        assert!(runner.runs().is_empty());
        assert_eq!(reporter.lines(), ["No applicable patches"]);
    }

    #[test]
    fn test_shared_target_reinstalled_once() {
        let state = state(&[("lib/x", "2.5.0")]);
        let lifecycle = FakeLifecycle::default();
        let runner = FakeRunner::default();
        let reporter = MemoryReporter::new();

        let patches = vec![patch("a", "lib/x"), patch("b", "lib/x")];
        let mut applier = PatchApplier::new(&state, &lifecycle, &runner, &reporter);
        let report = applier.apply(&patches).unwrap();

        assert_eq!(report.patches_applied, 2);
        assert_eq!(report.packages_reinstalled, 1);
        assert_eq!(lifecycle.calls(), ["remove lib/x", "download lib/x"]);
        assert_eq!(runner.runs(), ["a", "b"]);
    }

    #[test]
    fn test_distinct_targets_each_reinstalled() {
        let state = state(&[("lib/x", "1.0.0"), ("lib/y", "1.0.0")]);
        let lifecycle = FakeLifecycle::default();
        let runner = FakeRunner::default();
        let reporter = MemoryReporter::new();

        let patches = vec![patch("a", "lib/x"), patch("b", "lib/y"), patch("c", "lib/x")];
        let mut applier = PatchApplier::new(&state, &lifecycle, &runner, &reporter);
        let report = applier.apply(&patches).unwrap();

        assert_eq!(report.packages_reinstalled, 2);
        assert_eq!(
            lifecycle.calls(),
            [
                "remove lib/x",
                "download lib/x",
                "remove lib/y",
                "download lib/y"
            ]
        );
    }

    #[test]
    fn test_failure_aborts_remaining_patches() {
        let state = state(&[("lib/x", "1.0.0"), ("lib/y", "1.0.0")]);
        let lifecycle = FakeLifecycle::default();
        let runner = FakeRunner::failing(&["b"]);
        let reporter = MemoryReporter::new();

        let patches = vec![patch("a", "lib/x"), patch("b", "lib/x"), patch("c", "lib/y")];
        let mut applier = PatchApplier::new(&state, &lifecycle, &runner, &reporter);
        let err = applier.apply(&patches).unwrap_err();

        assert!(matches!(err, Error::ApplyFailed(name) if name == "b"));
        // c never ran, and lib/y was never touched
        assert_eq!(runner.runs(), ["a", "b"]);
        assert_eq!(lifecycle.calls(), ["remove lib/x", "download lib/x"]);
    }

    #[test]
    fn test_failure_emits_tool_output_as_errors() {
        let state = state(&[("lib/x", "1.0.0")]);
        let lifecycle = FakeLifecycle::default();
        let runner = FakeRunner::failing(&["a"]);
        let reporter = MemoryReporter::new();

        let patches = vec![patch("a", "lib/x")];
        let mut applier = PatchApplier::new(&state, &lifecycle, &runner, &reporter);
        applier.apply(&patches).unwrap_err();

        assert_eq!(
            reporter.lines_at(Level::Error),
            ["Unable to apply \"a\"", "error: corrupt patch"]
        );
    }

    #[test]
    fn test_missing_package_is_a_consistency_error() {
        let state = state(&[]);
        let lifecycle = FakeLifecycle::default();
        let runner = FakeRunner::default();
        let reporter = MemoryReporter::new();

        let patches = vec![patch("a", "lib/ghost")];
        let mut applier = PatchApplier::new(&state, &lifecycle, &runner, &reporter);
        let err = applier.apply(&patches).unwrap_err();

        assert!(matches!(err, Error::StateDesync(name) if name == "lib/ghost"));
        assert!(runner.runs().is_empty());
    }

    #[test]
    fn test_message_sequencing() {
        let state = state(&[("lib/x", "2.5.0")]);
        let lifecycle = FakeLifecycle::default();
        let runner = FakeRunner::default();
        let reporter = MemoryReporter::new();

        let patches = vec![patch("a", "lib/x"), patch("b", "lib/x")];
        let mut applier = PatchApplier::new(&state, &lifecycle, &runner, &reporter);
        applier.apply(&patches).unwrap();

        let infos = reporter.lines_at(Level::Info);
        assert_eq!(infos.len(), 4);
        assert_eq!(infos[0], "Applying 2 applicable patches");
        assert!(infos[1].contains("Reinstalling lib/x (2.5.0)"));
        assert!(infos[2].contains("Patched lib/x (v2.5.0): a"));
        assert!(infos[3].contains("Patched lib/x (v2.5.0): b"));
    }

    #[test]
    fn test_separate_runs_do_not_share_reinstall_state() {
        let state = state(&[("lib/x", "1.0.0")]);
        let lifecycle = FakeLifecycle::default();
        let runner = FakeRunner::default();
        let reporter = MemoryReporter::new();

        let patches = vec![patch("a", "lib/x")];
        let mut first = PatchApplier::new(&state, &lifecycle, &runner, &reporter);
        first.apply(&patches).unwrap();

        let mut second = PatchApplier::new(&state, &lifecycle, &runner, &reporter);
        second.apply(&patches).unwrap();

        assert_eq!(
            lifecycle.calls(),
            [
                "remove lib/x",
                "download lib/x",
                "remove lib/x",
                "download lib/x"
            ]
        );
    }
}
