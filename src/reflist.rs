// src/reflist.rs

//! Package reference lists
//!
//! A `PackageRefList` is a set of opaque package keys kept as a sorted
//! vector. Sorting makes union and difference a single linear merge-scan,
//! which matters when a repository holds hundreds of thousands of packages.
//!
//! Keys are compared byte-for-byte. Nothing in this module interprets them.

use crate::error::Result;
use std::cmp::Ordering;

/// Sorted set of package reference keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageRefList {
    refs: Vec<Vec<u8>>,
}

impl PackageRefList {
    /// Create an empty reference list
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a reference list from arbitrary keys (sorted and deduplicated)
    pub fn from_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Vec<u8>>,
    {
        let mut refs: Vec<Vec<u8>> = keys.into_iter().map(Into::into).collect();
        refs.sort_unstable();
        refs.dedup();
        Self { refs }
    }

    /// Number of keys in the list
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Iterate keys in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.refs.iter().map(Vec::as_slice)
    }

    /// Visit every key in sorted order, stopping at the first error
    ///
    /// The list itself is borrowed immutably for the duration of the walk, so
    /// the visitor cannot remove entries from it. Calling `for_each` again
    /// starts over from the first key.
    pub fn for_each<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(&[u8]) -> Result<()>,
    {
        for key in &self.refs {
            visit(key)?;
        }
        Ok(())
    }

    /// Union of two lists
    ///
    /// With `allow_duplicates` false every key appears once. With it true a key
    /// present in both lists is kept twice, so the result counts references
    /// rather than distinct packages.
    pub fn merge(&self, other: &PackageRefList, allow_duplicates: bool) -> PackageRefList {
        let mut refs = Vec::with_capacity(self.refs.len() + other.refs.len());
        let (mut i, mut j) = (0, 0);

        while i < self.refs.len() && j < other.refs.len() {
            match self.refs[i].cmp(&other.refs[j]) {
                Ordering::Less => {
                    refs.push(self.refs[i].clone());
                    i += 1;
                }
                Ordering::Greater => {
                    refs.push(other.refs[j].clone());
                    j += 1;
                }
                Ordering::Equal => {
                    refs.push(self.refs[i].clone());
                    if allow_duplicates {
                        refs.push(other.refs[j].clone());
                    }
                    i += 1;
                    j += 1;
                }
            }
        }
        refs.extend_from_slice(&self.refs[i..]);
        refs.extend_from_slice(&other.refs[j..]);

        PackageRefList { refs }
    }

    /// Keys present in `self` but absent from `other`
    pub fn subtract(&self, other: &PackageRefList) -> PackageRefList {
        PackageRefList {
            refs: sorted_difference(&self.refs, &other.refs),
        }
    }

    /// Consume the list, returning the sorted keys
    pub fn into_keys(self) -> Vec<Vec<u8>> {
        self.refs
    }
}

impl FromIterator<Vec<u8>> for PackageRefList {
    fn from_iter<T: IntoIterator<Item = Vec<u8>>>(iter: T) -> Self {
        Self::from_keys(iter)
    }
}

/// Elements of sorted `left` that do not occur in sorted `right`
///
/// Both inputs must already be sorted ascending. Duplicates are allowed on
/// either side; every copy of a value present in `right` is dropped from the
/// output, other duplicates are kept as they appear in `left`.
pub fn sorted_difference<T: Ord + Clone>(left: &[T], right: &[T]) -> Vec<T> {
    let mut result = Vec::new();
    let mut j = 0;

    for item in left {
        while j < right.len() && right[j] < *item {
            j += 1;
        }
        if j < right.len() && right[j] == *item {
            continue;
        }
        result.push(item.clone());
    }

    result
}

/// Render a key for logs and error messages
pub fn display_key(key: &[u8]) -> String {
    String::from_utf8_lossy(key).into_owned()
}
