// src/resolver.rs

//! Patch applicability resolution
//!
//! Decides which manifest patches apply to the current installation. Each
//! patch is evaluated independently against the installed snapshot and gets
//! an explicit outcome; skips are ordinary values, never errors. The single
//! fatal case is a non-optional condition naming a package that is not
//! installed - that is a configuration error, not a skip.
//!
//! Conditions form a short-circuiting conjunction: the first condition that
//! fails (or whose optional target is absent) skips the whole patch without
//! evaluating the rest.

use tracing::debug;

use crate::error::{Error, Result};
use crate::manifest::Patch;
use crate::state::InstallState;

/// Outcome of evaluating one patch against the installed set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applicability {
    /// Target installed and every condition satisfied
    Applicable,

    /// Target package is not part of this installation
    SkippedMissingTarget,

    /// Condition at this index was not satisfied, or its optional target
    /// is absent
    SkippedCondition(usize),
}

impl Applicability {
    pub fn is_applicable(&self) -> bool {
        matches!(self, Applicability::Applicable)
    }

    /// Get a human-readable description
    pub fn description(&self) -> String {
        match self {
            Applicability::Applicable => "applicable".to_string(),
            Applicability::SkippedMissingTarget => {
                "target package is not installed".to_string()
            }
            Applicability::SkippedCondition(index) => {
                format!("condition #{index} is not satisfied")
            }
        }
    }
}

/// Evaluate a single patch against the installed set
pub fn evaluate(patch: &Patch, state: &InstallState) -> Result<Applicability> {
    if state.package(patch.target_name()).is_none() {
        return Ok(Applicability::SkippedMissingTarget);
    }

    for (index, condition) in patch.conditions().iter().enumerate() {
        let target = condition.effective_target(patch.target_name());

        match state.package(target) {
            None if condition.is_optional() => {
                return Ok(Applicability::SkippedCondition(index));
            }
            None => {
                return Err(Error::MissingConditionTarget {
                    patch: patch.name().to_string(),
                    index,
                    target: target.to_string(),
                });
            }
            Some(package) => {
                if !condition.constraint().matches(&package.version) {
                    return Ok(Applicability::SkippedCondition(index));
                }
            }
        }
    }

    Ok(Applicability::Applicable)
}

/// Compute the ordered subset of patches that apply to this installation
///
/// The result preserves the manifest order of the patches that qualify.
pub fn resolve(patches: &[Patch], state: &InstallState) -> Result<Vec<Patch>> {
    let mut applicable = Vec::new();

    for patch in patches {
        match evaluate(patch, state)? {
            Applicability::Applicable => applicable.push(patch.clone()),
            outcome => {
                debug!("Skipping patch '{}': {}", patch.name(), outcome.description());
            }
        }
    }

    debug!(
        "Resolved {} applicable patches out of {}",
        applicable.len(),
        patches.len()
    );
    Ok(applicable)
}
