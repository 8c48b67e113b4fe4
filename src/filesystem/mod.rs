// src/filesystem/mod.rs

//! Filesystem operations for depot
//!
//! Package files are kept in a pool addressed by their SHA-256 checksum.
//! The metadata database says which pool paths are still referenced; the
//! pool itself knows nothing about packages.

mod pool;

pub use pool::{PackagePool, derive_path};
