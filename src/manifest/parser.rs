// src/manifest/parser.rs

//! Parser and validator for patch manifest TOML files.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::{ManifestError, ManifestResult, Patch, PatchCondition};
use crate::constraint::PatchConstraint;

/// Current manifest file version
pub const MANIFEST_VERSION: u32 = 1;

/// Raw manifest file shape, before validation
#[derive(Debug, Deserialize)]
struct ManifestFile {
    #[serde(default)]
    manifest: ManifestMeta,

    #[serde(default, rename = "patch")]
    patches: Vec<RawPatch>,
}

#[derive(Debug, Deserialize)]
struct ManifestMeta {
    #[serde(default = "default_version")]
    version: u32,
}

impl Default for ManifestMeta {
    fn default() -> Self {
        Self {
            version: MANIFEST_VERSION,
        }
    }
}

fn default_version() -> u32 {
    MANIFEST_VERSION
}

/// One patch record as written in the manifest
///
/// Identity fields default to empty strings so that missing and empty input
/// surface as the same indexed validation error instead of a bare
/// deserialization failure.
#[derive(Debug, Deserialize)]
struct RawPatch {
    #[serde(default)]
    name: String,

    #[serde(default)]
    description: String,

    #[serde(default)]
    target: String,

    #[serde(default)]
    filepath: String,

    #[serde(default = "default_precision")]
    precision: i64,

    #[serde(default)]
    conditions: Vec<RawCondition>,
}

fn default_precision() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
struct RawCondition {
    #[serde(default)]
    target: String,

    #[serde(default)]
    constraint: String,

    #[serde(default)]
    optional: bool,
}

/// Parse and validate a manifest from a TOML string
///
/// `base_dir` anchors relative `filepath` entries (normally the manifest
/// file's directory).
pub fn parse_manifest_str(content: &str, base_dir: &Path) -> ManifestResult<Vec<Patch>> {
    let file: ManifestFile = toml::from_str(content)?;

    if file.manifest.version != MANIFEST_VERSION {
        return Err(ManifestError::VersionMismatch {
            expected: MANIFEST_VERSION,
            found: file.manifest.version,
        });
    }

    file.patches
        .iter()
        .enumerate()
        .map(|(index, raw)| convert_patch(index, raw, base_dir))
        .collect()
}

fn convert_patch(index: usize, raw: &RawPatch, base_dir: &Path) -> ManifestResult<Patch> {
    let invalid = |reason: &str| ManifestError::InvalidPatch {
        index,
        reason: reason.to_string(),
    };

    if raw.name.is_empty() {
        return Err(invalid("name is required"));
    }
    if raw.description.is_empty() {
        return Err(invalid("description is required"));
    }
    if raw.target.is_empty() {
        return Err(invalid("target is required"));
    }
    if raw.filepath.is_empty() {
        return Err(invalid("patch file is required"));
    }

    let file_path = resolve_patch_file(&raw.filepath, base_dir);
    if !file_path.is_file() {
        return Err(invalid(&format!("patch not found: {}", raw.filepath)));
    }

    let mut conditions = Vec::with_capacity(raw.conditions.len());
    for (cond_index, raw_cond) in raw.conditions.iter().enumerate() {
        conditions.push(convert_condition(index, cond_index, raw_cond)?);
    }

    Patch::new(
        &raw.name,
        &raw.description,
        &raw.target,
        conditions,
        file_path,
        raw.precision,
    )
    .ok_or_else(|| invalid("invalid patch record"))
}

fn convert_condition(
    index: usize,
    cond_index: usize,
    raw: &RawCondition,
) -> ManifestResult<PatchCondition> {
    let invalid = |reason: String| ManifestError::InvalidCondition {
        index,
        condition: cond_index,
        reason,
    };

    if raw.target.is_empty() {
        return Err(invalid("target is required".to_string()));
    }
    if raw.constraint.is_empty() {
        return Err(invalid("constraint is required".to_string()));
    }

    let constraint =
        PatchConstraint::parse(&raw.constraint).map_err(|e| invalid(e.to_string()))?;

    PatchCondition::new(&raw.target, constraint, raw.optional)
        .ok_or_else(|| invalid("target is required".to_string()))
}

fn resolve_patch_file(filepath: &str, base_dir: &Path) -> PathBuf {
    let path = Path::new(filepath);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
