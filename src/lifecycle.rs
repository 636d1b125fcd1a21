// src/lifecycle.rs

//! Package lifecycle collaborator
//!
//! The reinstall step needs three capabilities from the surrounding package
//! manager: where a package lives on disk, how to remove its contents, and
//! how to re-materialize them. [`PackageLifecycle`] is that narrow contract;
//! [`DistLifecycle`] is the production implementation, re-materializing
//! packages from their recorded dist archives (gzip tarballs, fetched over
//! HTTP into a cache directory or read from a local path).

use flate2::read::GzDecoder;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::state::{DistSource, InstalledPackage};

/// Install/remove/download capabilities for one package at a time
pub trait PackageLifecycle {
    /// Where the package's contents live on disk
    fn install_path(&self, package: &InstalledPackage) -> PathBuf;

    /// Remove the package's installed contents
    fn remove(&self, package: &InstalledPackage, path: &Path) -> Result<()>;

    /// Re-materialize the package's pristine contents at the same path
    fn download(&self, package: &InstalledPackage, path: &Path) -> Result<()>;
}

/// Lifecycle backed by dist archives recorded in the installed snapshot
#[derive(Debug)]
pub struct DistLifecycle {
    root: PathBuf,
    cache_dir: PathBuf,
    client: reqwest::blocking::Client,
}

impl DistLifecycle {
    /// Create a lifecycle rooted at the package install directory
    pub fn new(root: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            root: root.into(),
            cache_dir: cache_dir.into(),
            client: reqwest::blocking::Client::builder().build()?,
        })
    }

    /// Locate the package's dist archive on disk, fetching it if remote
    fn fetch_archive(&self, package: &InstalledPackage, dist: &DistSource) -> Result<PathBuf> {
        if dist.url.starts_with("http://") || dist.url.starts_with("https://") {
            self.fetch_remote(package, dist)
        } else {
            let path = PathBuf::from(&dist.url);
            if !path.is_file() {
                return Err(Error::DownloadError {
                    package: package.name.clone(),
                    url: dist.url.clone(),
                    reason: "local dist archive does not exist".to_string(),
                });
            }
            if let Some(expected) = &dist.sha256 {
                verify_checksum(&path, expected)?;
            }
            Ok(path)
        }
    }

    fn fetch_remote(&self, package: &InstalledPackage, dist: &DistSource) -> Result<PathBuf> {
        let dest = self.cache_dir.join(cache_filename(package, &dist.url));

        if dest.is_file() {
            match &dist.sha256 {
                Some(expected) => {
                    if verify_checksum(&dest, expected).is_ok() {
                        debug!("Using cached dist archive: {}", dest.display());
                        return Ok(dest);
                    }
                    debug!(
                        "Cached dist archive failed checksum, refetching: {}",
                        dest.display()
                    );
                    let _ = fs::remove_file(&dest);
                }
                None => {
                    debug!("Using cached dist archive: {}", dest.display());
                    return Ok(dest);
                }
            }
        }

        fs::create_dir_all(&self.cache_dir)?;
        info!("Downloading {} from {}", package.name, dist.url);

        let mut response =
            self.client
                .get(&dist.url)
                .send()
                .and_then(|r| r.error_for_status())
                .map_err(|e| Error::DownloadError {
                    package: package.name.clone(),
                    url: dist.url.clone(),
                    reason: e.to_string(),
                })?;

        let mut file = File::create(&dest)?;
        io::copy(&mut response, &mut file)?;

        // Verify checksum - clean up the invalid cached file on failure
        if let Some(expected) = &dist.sha256
            && let Err(e) = verify_checksum(&dest, expected)
        {
            let _ = fs::remove_file(&dest);
            return Err(e);
        }

        Ok(dest)
    }

    fn unpack(&self, archive_path: &Path, dest: &Path) -> Result<()> {
        debug!(
            "Unpacking {} into {}",
            archive_path.display(),
            dest.display()
        );
        let file = File::open(archive_path)?;
        let mut archive = tar::Archive::new(GzDecoder::new(file));
        archive.unpack(dest)?;
        Ok(())
    }
}

impl PackageLifecycle for DistLifecycle {
    fn install_path(&self, package: &InstalledPackage) -> PathBuf {
        self.root.join(&package.name)
    }

    fn remove(&self, _package: &InstalledPackage, path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_dir_all(path)?;
        }
        Ok(())
    }

    fn download(&self, package: &InstalledPackage, path: &Path) -> Result<()> {
        let dist = package
            .dist
            .as_ref()
            .ok_or_else(|| Error::MissingDist(package.name.clone()))?;

        let archive_path = self.fetch_archive(package, dist)?;
        fs::create_dir_all(path)?;
        self.unpack(&archive_path, path)
    }
}

/// Cache filename for a downloaded dist archive
fn cache_filename(package: &InstalledPackage, url: &str) -> String {
    url.split('/')
        .next_back()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| {
            format!(
                "{}-{}.tar.gz",
                package.name.replace('/', "-"),
                package.version
            )
        })
}

/// Verify a file's SHA-256 against the expected hex digest
fn verify_checksum(path: &Path, expected: &str) -> Result<()> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    let actual = hex::encode(hasher.finalize());

    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(Error::ChecksumMismatch(format!(
            "{}: expected {}, got {}",
            path.display(),
            expected,
            actual
        )))
    }
}
