// src/db/models/mod.rs

//! Data models for depot database entities
//!
//! This module defines Rust structs that correspond to database tables
//! and provides methods for creating, reading, updating, and deleting records.

mod local_repo;
mod mirror;
mod package;
mod ref_list;
mod snapshot;

pub use local_repo::LocalRepo;
pub use mirror::RemoteMirror;
pub use package::{PackageFile, PackageRecord};
pub use ref_list::{EntityKind, load_ref_list};
pub use snapshot::Snapshot;
