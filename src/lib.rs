// src/lib.rs

//! Depot: content-addressed Debian package repository
//!
//! Packages pulled in by mirrors or uploaded to local repositories are
//! recorded in a SQLite metadata store, and their files live in a pool
//! addressed by checksum. Mirrors, local repositories and snapshots each
//! hold a reference list naming the packages they keep alive.
//!
//! # Architecture
//!
//! - Database-first: all state in SQLite, no config files
//! - Shared storage: one package record and one pool file, however many lists reference them
//! - Mark-and-sweep cleanup (`gc`) reclaims whatever nothing references any more
//! - Narrow interfaces (`gc::traits`) between the cleanup core and storage

pub mod collection;
pub mod db;
mod error;
pub mod filesystem;
pub mod gc;
pub mod progress;
pub mod reflist;

pub use collection::CollectionFactory;
pub use error::{DeleteTarget, Error, Result};
pub use filesystem::PackagePool;
pub use gc::{DropOutcome, GarbageCollector, GcOptions, GcReport};
pub use progress::{CallbackProgress, LogProgress, ProgressEvent, ProgressTracker, SilentProgress};
pub use reflist::PackageRefList;
