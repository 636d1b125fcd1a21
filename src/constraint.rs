// src/constraint.rs

//! Version-range constraints for patch conditions
//!
//! A constraint is an opaque range expression (`^1.2`, `>=2.0 <3.0`,
//! `1.4.*`) evaluated against a package's concrete installed version.
//! Expressions are parsed once at manifest validation time, so a malformed
//! range is a configuration error, never a runtime surprise.

use semver::{Version, VersionReq};
use std::fmt;

use crate::error::{Error, Result};

/// A parsed version-range constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchConstraint {
    raw: String,
    req: VersionReq,
}

/// Comparison operators that may stand alone as a token when the range is
/// written with spaces between operator and version (`>= 2.0`)
const OPERATORS: &[&str] = &[">=", "<=", "!=", "=", ">", "<", "^", "~"];

impl PatchConstraint {
    /// Parse a range expression
    ///
    /// Accepts comma-separated conjunctions as well as the whitespace form
    /// (`>=2.0 <3.0`), which is normalized to comma form before parsing.
    pub fn parse(s: &str) -> Result<Self> {
        let normalized = normalize(s);
        if normalized.is_empty() {
            return Err(Error::InvalidConstraint {
                constraint: s.to_string(),
                reason: "empty constraint".to_string(),
            });
        }

        let req = VersionReq::parse(&normalized).map_err(|e| Error::InvalidConstraint {
            constraint: s.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            raw: s.to_string(),
            req,
        })
    }

    /// The expression as written in the manifest
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Check whether a concrete version satisfies the range
    ///
    /// A version that cannot be read as a version number does not satisfy
    /// any range; the snapshot is external input and garbage in it makes a
    /// condition false, not the run fatal.
    pub fn matches(&self, version: &str) -> bool {
        match parse_version_lenient(version) {
            Some(v) => self.req.matches(&v),
            None => false,
        }
    }
}

impl fmt::Display for PatchConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Rewrite a range expression into the comma-separated conjunction form
///
/// Tokens are split on whitespace and commas; a bare operator token is glued
/// back onto the version that follows it.
fn normalize(s: &str) -> String {
    let tokens: Vec<&str> = s
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();

    let mut parts: Vec<String> = Vec::with_capacity(tokens.len());
    let mut pending_op: Option<&str> = None;

    for token in tokens {
        if OPERATORS.contains(&token) {
            pending_op = Some(token);
            continue;
        }
        match pending_op.take() {
            Some(op) => parts.push(format!("{op}{token}")),
            None => parts.push(token.to_string()),
        }
    }

    parts.join(", ")
}

/// Parse a concrete version string, tolerating short and over-long forms
///
/// Versions with fewer than three numeric components are padded (`2.5` ->
/// `2.5.0`); components beyond the third are dropped (`1.4.2.0` -> `1.4.2`).
/// A version whose leading component is not numeric yields `None`.
pub fn parse_version_lenient(version: &str) -> Option<Version> {
    let s = version.trim();
    let s = s.strip_prefix('v').unwrap_or(s);

    if let Ok(v) = Version::parse(s) {
        return Some(v);
    }

    // Split off any prerelease/build suffix before padding components
    let numeric = s
        .split(|c| c == '-' || c == '+')
        .next()
        .unwrap_or(s);

    let parts: Vec<&str> = numeric.split('.').collect();
    let major = parts.first().and_then(|p| p.parse::<u64>().ok())?;
    let minor = parts.get(1).and_then(|p| p.parse::<u64>().ok()).unwrap_or(0);
    let patch = parts.get(2).and_then(|p| p.parse::<u64>().ok()).unwrap_or(0);

    Some(Version::new(major, minor, patch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caret_range() {
        let c = PatchConstraint::parse("^1.0").unwrap();
        assert!(c.matches("1.4.2"));
        assert!(!c.matches("2.0.0"));
    }

    #[test]
    fn test_whitespace_conjunction() {
        let c = PatchConstraint::parse(">=2.0 <3.0").unwrap();
        assert!(c.matches("2.0.0"));
        assert!(c.matches("2.9.9"));
        assert!(!c.matches("3.0.0"));
        assert!(!c.matches("1.9.0"));
    }

    #[test]
    fn test_spaced_operator() {
        let c = PatchConstraint::parse(">= 1.2").unwrap();
        assert!(c.matches("1.2.0"));
        assert!(!c.matches("1.1.9"));
    }

    #[test]
    fn test_comma_form_passthrough() {
        let c = PatchConstraint::parse(">=2.0, <3.0").unwrap();
        assert!(c.matches("2.5.0"));
        assert!(!c.matches("3.1.0"));
    }

    #[test]
    fn test_short_version_padding() {
        let c = PatchConstraint::parse("^2.0").unwrap();
        assert!(c.matches("2.5"));
    }

    #[test]
    fn test_overlong_version_truncation() {
        let c = PatchConstraint::parse("^1.4").unwrap();
        assert!(c.matches("1.4.2.0"));
    }

    #[test]
    fn test_v_prefix() {
        let c = PatchConstraint::parse("^2.0").unwrap();
        assert!(c.matches("v2.5.0"));
    }

    #[test]
    fn test_garbage_version_never_matches() {
        let c = PatchConstraint::parse("*").unwrap();
        assert!(!c.matches("dev-master"));
    }

    #[test]
    fn test_invalid_constraint_rejected() {
        assert!(PatchConstraint::parse("not a range").is_err());
        assert!(PatchConstraint::parse("").is_err());
    }

    #[test]
    fn test_display_preserves_raw() {
        let c = PatchConstraint::parse(">=2.0 <3.0").unwrap();
        assert_eq!(c.to_string(), ">=2.0 <3.0");
    }
}
