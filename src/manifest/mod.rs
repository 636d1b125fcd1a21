// src/manifest/mod.rs

//! Patch manifest - declarative patch configuration
//!
//! The manifest is a TOML file describing every patch the installation may
//! need: what it changes, which package it targets, and the version-range
//! conditions that gate it. Records are validated at ingestion; the rest of
//! the crate only ever sees fully valid [`Patch`] values.
//!
//! # Example remedy.toml
//!
//! ```toml
//! [manifest]
//! version = 1
//!
//! [[patch]]
//! name = "fix-null-deref"
//! description = "Backport upstream fix for the NULL deref in the router"
//! target = "acme/router"
//! filepath = "patches/fix-null-deref.diff"
//! precision = 1
//! conditions = [
//!     { target = "_self", constraint = ">=2.0 <3.0" },
//!     { target = "acme/kernel", constraint = "^1.4", optional = true },
//! ]
//! ```

pub mod parser;

pub use parser::{parse_manifest_str, MANIFEST_VERSION};

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constraint::PatchConstraint;

/// Default path for the patch manifest file
pub const DEFAULT_MANIFEST_PATH: &str = "remedy.toml";

/// Condition target meaning "the patch's own target package"
pub const SELF_TARGET: &str = "_self";

/// Errors that can occur when loading and validating a manifest
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse manifest file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid manifest version: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Error in patch #{index}: {reason}")]
    InvalidPatch { index: usize, reason: String },

    #[error("Error in patch #{index}, condition #{condition}: {reason}")]
    InvalidCondition {
        index: usize,
        condition: usize,
        reason: String,
    },
}

/// Result type for manifest operations
pub type ManifestResult<T> = Result<T, ManifestError>;

/// A prerequisite on a package's installed version that gates a patch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchCondition {
    target_name: String,
    constraint: PatchConstraint,
    optional: bool,
}

impl PatchCondition {
    /// Build a condition; the target must be non-empty
    pub fn new(
        target_name: impl Into<String>,
        constraint: PatchConstraint,
        optional: bool,
    ) -> Option<Self> {
        let target_name = target_name.into();
        if target_name.is_empty() {
            return None;
        }
        Some(Self {
            target_name,
            constraint,
            optional,
        })
    }

    /// The package name this condition is declared against (may be `_self`)
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// Resolve the declared target against the owning patch's target
    pub fn effective_target<'a>(&'a self, patch_target: &'a str) -> &'a str {
        if self.target_name == SELF_TARGET {
            patch_target
        } else {
            &self.target_name
        }
    }

    pub fn constraint(&self) -> &PatchConstraint {
        &self.constraint
    }

    /// Whether an absent target means "skip the patch" instead of a
    /// configuration error
    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

/// A named unit of change targeting one installed package
///
/// Only constructible in a fully validated form: non-empty identity fields,
/// precision already clamped. The manifest parser additionally guarantees
/// the patch file existed at validation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    name: String,
    description: String,
    target_name: String,
    conditions: Vec<PatchCondition>,
    file_path: PathBuf,
    precision: u32,
}

impl Patch {
    /// Build a patch; identity fields must be non-empty and a negative
    /// precision clamps to 0
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        target_name: impl Into<String>,
        conditions: Vec<PatchCondition>,
        file_path: impl Into<PathBuf>,
        precision: i64,
    ) -> Option<Self> {
        let name = name.into();
        let description = description.into();
        let target_name = target_name.into();
        let file_path = file_path.into();

        if name.is_empty() || description.is_empty() || target_name.is_empty() {
            return None;
        }
        if file_path.as_os_str().is_empty() {
            return None;
        }

        Some(Self {
            name,
            description,
            target_name,
            conditions,
            file_path,
            precision: precision.max(0) as u32,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The package this patch modifies
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    pub fn conditions(&self) -> &[PatchCondition] {
        &self.conditions
    }

    /// Path to the unified-diff file
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Path-strip count passed to the patch tool (`-p<n>`)
    pub fn precision(&self) -> u32 {
        self.precision
    }
}

/// Load and validate a patch manifest from a TOML file
///
/// Relative `filepath` entries resolve against the manifest's directory.
pub fn load_manifest(path: &Path) -> ManifestResult<Vec<Patch>> {
    let content = std::fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_manifest_str(&content, base_dir)
}

/// Check if a manifest file exists
pub fn manifest_exists(path: Option<&Path>) -> bool {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_MANIFEST_PATH));
    path.exists()
}
