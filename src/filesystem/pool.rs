// src/filesystem/pool.rs

//! Package pool: checksum-addressed storage for package files
//!
//! Every file lives at `<c0c1>/<c2c3>/<filename>` under the pool root, where
//! `c0..c3` are the first hex digits of its SHA-256 checksum. Two packages
//! shipping the same file share one pool entry, so a pool file can only be
//! removed once no surviving package references its path.

use crate::db::models::PackageFile;
use crate::error::{Error, Result};
use crate::gc::traits::PoolStorage;
use crate::progress::ProgressTracker;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Minimum checksum length needed to derive the two directory levels
const MIN_CHECKSUM_LEN: usize = 4;

/// Directory under the pool root where writes are staged before the rename
///
/// Pool paths always start with two hex digits, so this name never collides
/// with a real entry and the pool scan skips it.
const STAGING_DIR: &str = ".staging";

/// Filesystem-backed package pool
#[derive(Debug, Clone)]
pub struct PackagePool {
    /// Root directory of the pool (e.g., /var/lib/depot/pool)
    root: PathBuf,
}

impl PackagePool {
    /// Open a pool rooted at `root`, creating the directory if needed
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        if !root.exists() {
            fs::create_dir_all(&root)?;
            debug!("Created pool directory: {:?}", root);
        }

        Ok(Self { root })
    }

    /// Get the pool root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a pool-relative path
    pub fn full_path(&self, relative: &str) -> Result<PathBuf> {
        let rel = Path::new(relative);
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(Error::InvalidPath(format!(
                "Pool path must be relative and normalized: {relative}"
            )));
        }
        Ok(self.root.join(rel))
    }

    /// Check whether a pool-relative path exists
    pub fn exists(&self, relative: &str) -> bool {
        self.full_path(relative).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Store file content in the pool under `filename`
    ///
    /// If the same content is already present this is a no-op. Returns the
    /// file description to attach to a package record.
    pub fn store(&self, filename: &str, content: &[u8]) -> Result<PackageFile> {
        let checksum = hex::encode(Sha256::digest(content));
        let relative = derive_path(filename, &checksum)?;
        let path = self.root.join(&relative);

        if path.exists() {
            debug!("Content already in pool: {}", relative);
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }

            // Write to a staged file, then rename into place
            let staging = self.root.join(STAGING_DIR);
            fs::create_dir_all(&staging)?;
            let temp_path = staging.join(format!("{}.{}.tmp", checksum, std::process::id()));
            if let Err(e) = write_staged(&temp_path, &path, content) {
                let _ = fs::remove_file(&temp_path);
                return Err(e);
            }

            debug!("Stored {} in pool ({} bytes)", relative, content.len());
        }

        Ok(PackageFile::new(
            filename.to_string(),
            checksum,
            content.len() as i64,
        ))
    }
}

impl PoolStorage for PackagePool {
    fn relative_path(&self, filename: &str, checksum: &str) -> Result<String> {
        derive_path(filename, checksum)
    }

    fn filepath_list(&self, progress: &dyn ProgressTracker) -> Result<Vec<String>> {
        let mut paths = Vec::new();

        if !self.root.exists() {
            return Ok(paths);
        }

        progress.set_message("Scanning package pool");
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| e.depth() != 1 || e.file_name() != STAGING_DIR);

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .map_err(|e| Error::InvalidPath(e.to_string()))?;

            let Some(parts) = relative
                .components()
                .map(|c| c.as_os_str().to_str())
                .collect::<Option<Vec<_>>>()
            else {
                // Such a file can never be matched against a reference, and
                // skipping it would leave it in the pool forever
                return Err(Error::InvalidPath(format!(
                    "Pool entry is not valid UTF-8: {}",
                    entry.path().display()
                )));
            };

            paths.push(parts.join("/"));
            progress.increment(1);
        }

        paths.sort();
        Ok(paths)
    }

    fn remove(&self, path: &str) -> Result<u64> {
        let full = self.full_path(path)?;
        let size = fs::metadata(&full)?.len();
        fs::remove_file(&full)?;
        debug!("Removed pool file {} ({} bytes)", path, size);
        Ok(size)
    }

    fn size_of(&self, path: &str) -> Result<u64> {
        let full = self.full_path(path)?;
        Ok(fs::metadata(full)?.len())
    }
}

fn write_staged(temp_path: &Path, path: &Path, content: &[u8]) -> Result<()> {
    let mut file = fs::File::create(temp_path)?;
    file.write_all(content)?;
    file.sync_all()?;
    fs::rename(temp_path, path)?;
    Ok(())
}

/// Derive the pool-relative path for a file
///
/// Path format: `{c[0..2]}/{c[2..4]}/{filename}`
/// Example: `("hello_1.0_amd64.deb", "abcd12...")` -> `ab/cd/hello_1.0_amd64.deb`
pub fn derive_path(filename: &str, checksum: &str) -> Result<String> {
    if filename.is_empty() || filename.contains('/') || filename == "." || filename == ".." {
        return Err(Error::InvalidPath(format!(
            "Invalid package filename: '{filename}'"
        )));
    }
    if checksum.len() < MIN_CHECKSUM_LEN || !checksum.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::InvalidPath(format!(
            "Checksum '{checksum}' cannot address a pool path for {filename}"
        )));
    }

    let checksum = checksum.to_ascii_lowercase();
    Ok(format!("{}/{}/{}", &checksum[0..2], &checksum[2..4], filename))
}
