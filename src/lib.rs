// src/lib.rs

//! Remedy Patch Orchestrator
//!
//! Declarative patching for installed package trees. Given a manifest of
//! source-code patches and a snapshot of the installed packages, remedy
//! determines which patches apply to the current installation (presence and
//! version-range conditions), reinstalls each target package to a pristine
//! state, and applies the patches with an external diff tool, stopping at
//! the first failure.
//!
//! # Architecture
//!
//! - Manifest-first: patches are declared in a TOML file and validated
//!   before any resolution runs
//! - Snapshot-driven: the installed package set is an externally produced
//!   lockfile, queried read-only
//! - Narrow collaborators: package lifecycle and the patch tool sit behind
//!   traits so the orchestration core is testable with in-memory fakes

pub mod apply;
pub mod constraint;
mod error;
pub mod lifecycle;
pub mod manifest;
pub mod report;
pub mod resolver;
pub mod state;

pub use apply::{ApplyOutcome, ApplyReport, CommandRunner, PatchApplier, PatchRunner};
pub use constraint::PatchConstraint;
pub use error::{Error, Result};
pub use lifecycle::{DistLifecycle, PackageLifecycle};
pub use manifest::{
    ManifestError, Patch, PatchCondition, load_manifest, manifest_exists, DEFAULT_MANIFEST_PATH,
};
pub use report::{ConsoleReporter, LogReporter, MemoryReporter, Reporter};
pub use resolver::{resolve, Applicability};
pub use state::{DistSource, InstallState, InstalledPackage, load_state};
