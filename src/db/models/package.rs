// src/db/models/package.rs

//! PackageRecord model - package metadata and the files each package owns

use crate::error::{Error, Result};
use crate::gc::traits::PoolStorage;
use crate::reflist::PackageRefList;
use rusqlite::{Connection, OptionalExtension, Row, params};
use sha2::{Digest, Sha256};

/// A single file belonging to a package (e.g. the .deb itself)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFile {
    pub filename: String,
    /// Hex checksum of the file contents; drives the pool layout
    pub checksum: String,
    pub size: i64,
}

impl PackageFile {
    pub fn new(filename: String, checksum: String, size: i64) -> Self {
        Self {
            filename,
            checksum,
            size,
        }
    }
}

/// A package record in the metadata store
#[derive(Debug, Clone)]
pub struct PackageRecord {
    /// Opaque reference key; computed from the other fields on insert
    pub key: Vec<u8>,
    pub name: String,
    pub version: String,
    pub architecture: String,
    pub files: Vec<PackageFile>,
    pub created_at: Option<String>,
}

impl PackageRecord {
    /// Create a new package record without files
    pub fn new(name: String, version: String, architecture: String) -> Self {
        let mut record = Self {
            key: Vec::new(),
            name,
            version,
            architecture,
            files: Vec::new(),
            created_at: None,
        };
        record.key = record.compute_key();
        record
    }

    /// Attach a file, recomputing the key
    pub fn with_file(mut self, file: PackageFile) -> Self {
        self.files.push(file);
        self.key = self.compute_key();
        self
    }

    /// Derive the reference key: `P<arch> <name> <version> <fileshash>`
    ///
    /// Two uploads of the same name/version with different contents get
    /// different keys.
    pub fn compute_key(&self) -> Vec<u8> {
        let mut hasher = Sha256::new();
        for file in &self.files {
            hasher.update(file.filename.as_bytes());
            hasher.update([0]);
            hasher.update(file.checksum.as_bytes());
            hasher.update([0]);
            hasher.update(file.size.to_le_bytes());
        }
        let files_hash = hex::encode(hasher.finalize());

        format!(
            "P{} {} {} {}",
            self.architecture,
            self.name,
            self.version,
            &files_hash[..16]
        )
        .into_bytes()
    }

    /// Pool paths of every file in this package
    pub fn filepath_list(&self, pool: &dyn PoolStorage) -> Result<Vec<String>> {
        self.files
            .iter()
            .map(|file| pool.relative_path(&file.filename, &file.checksum))
            .collect()
    }

    /// Insert this package and its files into the database
    pub fn insert(&mut self, conn: &Connection) -> Result<()> {
        self.key = self.compute_key();

        conn.execute(
            "INSERT INTO packages (key, name, version, architecture) VALUES (?1, ?2, ?3, ?4)",
            params![&self.key, &self.name, &self.version, &self.architecture],
        )?;

        let mut stmt = conn.prepare(
            "INSERT INTO package_files (package_key, filename, checksum, size)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for file in &self.files {
            stmt.execute(params![&self.key, &file.filename, &file.checksum, file.size])?;
        }

        Ok(())
    }

    /// Find a package by its reference key, including its files
    pub fn find_by_key(conn: &Connection, key: &[u8]) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT key, name, version, architecture, created_at FROM packages WHERE key = ?1",
        )?;

        let record = stmt.query_row([key], Self::from_row).optional()?;

        match record {
            Some(mut record) => {
                record.files = Self::load_files(conn, key)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Like `find_by_key`, but a missing package is an error
    pub fn get_by_key(conn: &Connection, key: &[u8]) -> Result<Self> {
        Self::find_by_key(conn, key)?.ok_or_else(|| {
            Error::NotFoundError(format!(
                "Package {} not found",
                String::from_utf8_lossy(key)
            ))
        })
    }

    /// All package keys in the store
    pub fn all_keys(conn: &Connection) -> Result<PackageRefList> {
        let mut stmt = conn.prepare("SELECT key FROM packages")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, Vec<u8>>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(PackageRefList::from_keys(keys))
    }

    /// Delete a package by key; its files rows go with it
    ///
    /// Returns the number of package rows removed (0 or 1).
    pub fn delete(conn: &Connection, key: &[u8]) -> Result<usize> {
        let deleted = conn.execute("DELETE FROM packages WHERE key = ?1", [key])?;
        Ok(deleted)
    }

    fn load_files(conn: &Connection, key: &[u8]) -> Result<Vec<PackageFile>> {
        let mut stmt = conn.prepare(
            "SELECT filename, checksum, size FROM package_files
             WHERE package_key = ?1 ORDER BY id",
        )?;

        let files = stmt
            .query_map([key], |row| {
                Ok(PackageFile {
                    filename: row.get(0)?,
                    checksum: row.get(1)?,
                    size: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(files)
    }

    /// Convert a database row to a PackageRecord (files loaded separately)
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            key: row.get(0)?,
            name: row.get(1)?,
            version: row.get(2)?,
            architecture: row.get(3)?,
            files: Vec::new(),
            created_at: row.get(4)?,
        })
    }
}
