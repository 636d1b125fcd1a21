// src/state.rs

//! Installed package snapshot
//!
//! The snapshot is the read-only record of what the surrounding package
//! manager has installed: one entry per package with its concrete version,
//! a display version, and the dist archive it was materialized from. It is
//! produced externally (an `installed.json` lockfile) and loaded once per
//! run; remedy never writes it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::Result;

/// Default path for the installed snapshot file
pub const DEFAULT_SNAPSHOT_PATH: &str = "installed.json";

/// Where a package's pristine contents can be re-materialized from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistSource {
    /// Archive location: an HTTP(S) URL or a local path to a gzip tarball
    pub url: String,

    /// Expected SHA-256 of the archive, if the producer recorded one
    #[serde(default)]
    pub sha256: Option<String>,
}

/// One installed package as recorded in the snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPackage {
    /// Package name, unique within the snapshot
    pub name: String,

    /// Concrete resolvable version (e.g. `1.4.2`)
    pub version: String,

    /// Display form of the version (e.g. `v1.4.2`); falls back to `version`
    #[serde(default)]
    pub pretty_version: Option<String>,

    /// Dist archive for reinstallation; absent for packages the producer
    /// cannot re-materialize
    #[serde(default)]
    pub dist: Option<DistSource>,
}

impl InstalledPackage {
    /// The version string to show in user-facing output
    pub fn display_version(&self) -> &str {
        self.pretty_version.as_deref().unwrap_or(&self.version)
    }
}

/// The full installed package set, keyed by name
#[derive(Debug, Clone, Default)]
pub struct InstallState {
    installed: HashMap<String, InstalledPackage>,
}

impl InstallState {
    /// Create an empty state
    pub fn new() -> Self {
        Self {
            installed: HashMap::new(),
        }
    }

    /// Add or replace a package entry
    pub fn insert(&mut self, package: InstalledPackage) {
        self.installed.insert(package.name.clone(), package);
    }

    /// Look up a package by exact name
    pub fn package(&self, name: &str) -> Option<&InstalledPackage> {
        self.installed.get(name)
    }

    /// Check if a package is installed
    pub fn is_installed(&self, name: &str) -> bool {
        self.installed.contains_key(name)
    }

    /// Get count of installed packages
    pub fn package_count(&self) -> usize {
        self.installed.len()
    }

    /// Get all installed package names
    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.installed.keys().map(|s| s.as_str())
    }
}

/// Raw snapshot file shape
#[derive(Debug, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    packages: Vec<InstalledPackage>,
}

/// Load the installed snapshot from a JSON file
pub fn load_state(path: &Path) -> Result<InstallState> {
    let content = fs::read_to_string(path)?;
    parse_state(&content)
}

/// Parse the installed snapshot from a JSON string
///
/// Duplicate names are tolerated; the last entry wins.
pub fn parse_state(content: &str) -> Result<InstallState> {
    let file: SnapshotFile = serde_json::from_str(content)?;

    let mut state = InstallState::new();
    for package in file.packages {
        state.insert(package);
    }

    debug!("Loaded snapshot with {} installed packages", state.package_count());
    Ok(state)
}
