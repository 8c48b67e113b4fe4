// src/error.rs

//! Error types for depot
//!
//! Collaborator failures (SQLite, filesystem) convert directly. Failures
//! inside a cleanup run are wrapped with the phase and the key or path that
//! was being processed, keeping the original error as `source`.

use crate::db::models::EntityKind;
use crate::reflist::display_key;
use std::fmt;
use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// What a failed sweep deletion was targeting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    /// A package record in the metadata store
    Package(Vec<u8>),
    /// A file in the package pool, relative to the pool root
    File(String),
}

impl fmt::Display for DeleteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteTarget::Package(key) => write!(f, "package {}", display_key(key)),
            DeleteTarget::File(path) => write!(f, "pool file {}", path),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    /// SQLite failure
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal failure while walking the pool
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Missing identifiers, uninitialized records and similar setup problems
    #[error("Initialization error: {0}")]
    InitError(String),

    /// A named entity or keyed record does not exist
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Stored data could not be interpreted
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A pool path or filename is not acceptable
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A retaining entity failed to load during the mark phase
    #[error("Failed to load {kind} '{name}': {source}")]
    LoadFailure {
        kind: EntityKind,
        name: String,
        #[source]
        source: Box<Error>,
    },

    /// A live package could not be resolved to its pool files
    #[error("Failed to resolve files of package {}: {source}", display_key(.key))]
    ResolveFailure {
        key: Vec<u8>,
        #[source]
        source: Box<Error>,
    },

    /// The pool could not be enumerated
    #[error("Unable to collect file paths: {0}")]
    PoolListFailure(#[source] Box<Error>),

    /// A deletion failed mid-sweep; earlier deletions in the sweep stand
    #[error("Failed to delete {target}: {source}")]
    DeleteFailure {
        target: DeleteTarget,
        #[source]
        source: Box<Error>,
    },

    /// The metadata batch could not be persisted
    #[error("Unable to write to DB: {0}")]
    CommitFailure(#[source] Box<Error>),

    /// A mirror still has snapshots taken from it
    #[error(
        "Mirror '{mirror}' is used by snapshots ({}); won't delete mirror with snapshots, use force to override",
        .snapshots.join(", ")
    )]
    DependentsExist {
        mirror: String,
        snapshots: Vec<String>,
    },
}

impl Error {
    /// Whether the caller can recover by changing input or retrying with an override
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::DependentsExist { .. } | Error::NotFoundError(_))
    }
}
