// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

use remedy::apply::{ApplyOutcome, PatchRunner};
use remedy::manifest::Patch;
use remedy::Result;

/// Write a unified-diff placeholder file and return its path
pub fn write_diff(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, "--- a/src/lib.c\n+++ b/src/lib.c\n").unwrap();
    path
}

/// Write a manifest file and return its path
pub fn write_manifest(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("remedy.toml");
    fs::write(&path, body).unwrap();
    path
}

/// Write an installed snapshot file and return its path
pub fn write_snapshot(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("installed.json");
    fs::write(&path, body).unwrap();
    path
}

/// Build a gzip tarball holding a single `src/lib.c` with the given content.
///
/// Returns (TempDir, archive path) - keep the TempDir alive to prevent
/// cleanup.
pub fn make_dist_archive(content: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let archive_path = dir.path().join("dist.tar.gz");

    let file = File::create(&archive_path).unwrap();
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    let mut header = tar::Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, "src/lib.c", content.as_bytes())
        .unwrap();
    builder.into_inner().unwrap().finish().unwrap();

    (dir, archive_path)
}

/// One recorded patch tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRun {
    pub patch: String,
    pub precision: u32,
    pub workdir: PathBuf,
}

/// Patch runner that records invocations instead of spawning a tool.
///
/// Succeeds for every patch except those named via [`FakeRunner::failing`].
#[derive(Default)]
pub struct FakeRunner {
    failing: Vec<String>,
    runs: Mutex<Vec<RecordedRun>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(names: &[&str]) -> Self {
        Self {
            failing: names.iter().map(|s| s.to_string()).collect(),
            runs: Mutex::default(),
        }
    }

    pub fn runs(&self) -> Vec<RecordedRun> {
        self.runs.lock().unwrap().clone()
    }

    pub fn run_names(&self) -> Vec<String> {
        self.runs().into_iter().map(|r| r.patch).collect()
    }
}

impl PatchRunner for FakeRunner {
    fn run(&self, patch: &Patch, workdir: &Path) -> Result<ApplyOutcome> {
        self.runs.lock().unwrap().push(RecordedRun {
            patch: patch.name().to_string(),
            precision: patch.precision(),
            workdir: workdir.to_path_buf(),
        });

        if self.failing.contains(&patch.name().to_string()) {
            Ok(ApplyOutcome {
                success: false,
                exit_code: Some(1),
                lines: vec![
                    "error: patch failed: src/lib.c:1".to_string(),
                    "error: src/lib.c: patch does not apply".to_string(),
                ],
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
