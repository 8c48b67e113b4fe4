// src/db/paths.rs
//! Centralized path derivation for depot directories

use std::path::{Path, PathBuf};

/// Environment variable that relocates the package pool
pub const POOL_DIR_ENV: &str = "DEPOT_POOL_DIR";

/// Get the directory containing the database
pub fn db_dir(db_path: &str) -> PathBuf {
    Path::new(db_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("/var/lib/depot"))
        .to_path_buf()
}

/// Get the package pool directory
///
/// Honors `DEPOT_POOL_DIR`, otherwise `<db dir>/pool`.
pub fn pool_dir(db_path: &str) -> PathBuf {
    std::env::var_os(POOL_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| default_pool_dir(db_path))
}

/// The pool directory next to the database, ignoring the environment
pub fn default_pool_dir(db_path: &str) -> PathBuf {
    db_dir(db_path).join("pool")
}
