//! Directory grouping - partitions an ordered changeset sequence into
//! per-directory buckets
//!
//! The directory key of a changeset is its source path up to and including
//! the final `/`. Buckets keep first-encounter key order and preserve the
//! relative order of the input within each bucket.

use std::collections::HashMap;

use super::changeset::ChangeSet;
use crate::error::{SiltError, SiltResult};

/// One directory bucket: the changesets sharing a source directory,
/// in input order
#[derive(Debug)]
pub struct DirectoryBucket<'a> {
    /// Directory portion of the source path, including the trailing `/`
    pub directory: String,
    /// Changesets in the order they appeared in the input sequence
    pub change_sets: Vec<&'a ChangeSet>,
}

/// Ordered mapping directory key -> bucket, in first-encounter order
#[derive(Debug, Default)]
pub struct DirectoryBuckets<'a> {
    buckets: Vec<DirectoryBucket<'a>>,
}

impl<'a> DirectoryBuckets<'a> {
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DirectoryBucket<'a>> {
        self.buckets.iter()
    }

    /// Total changeset count across all buckets
    pub fn total_change_sets(&self) -> usize {
        self.buckets.iter().map(|b| b.change_sets.len()).sum()
    }
}

impl<'a> IntoIterator for &'a DirectoryBuckets<'a> {
    type Item = &'a DirectoryBucket<'a>;
    type IntoIter = std::slice::Iter<'a, DirectoryBucket<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}

/// Split a source path into its directory key.
///
/// The key keeps the trailing `/` so sibling files group together while
/// nested directories stay distinct. A path without a separator cannot be
/// routed and is a configuration error.
fn directory_key(change_set: &ChangeSet) -> SiltResult<String> {
    let path = change_set.source_path.as_str();
    match path.rfind('/') {
        Some(idx) => Ok(path[..=idx].to_string()),
        None => Err(SiltError::MalformedSourceLocation {
            id: change_set.id.clone(),
            path: path.to_string(),
        }),
    }
}

/// Partition an ordered changeset sequence by source directory.
///
/// Pure over its input: no changeset is dropped or duplicated, bucket keys
/// appear in first-encounter order, and each bucket preserves the relative
/// input order. The caller decides the overall direction (forward or
/// reverse) before grouping.
pub fn group_by_directory<'a>(change_sets: &[&'a ChangeSet]) -> SiltResult<DirectoryBuckets<'a>> {
    let mut buckets: Vec<DirectoryBucket<'a>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for &change_set in change_sets {
        let key = directory_key(change_set)?;
        match index.get(&key) {
            Some(&i) => buckets[i].change_sets.push(change_set),
            None => {
                index.insert(key.clone(), buckets.len());
                buckets.push(DirectoryBucket {
                    directory: key,
                    change_sets: vec![change_set],
                });
            }
        }
    }

    tracing::debug!("Grouped {} changesets into {} directory buckets", change_sets.len(), buckets.len());

    Ok(DirectoryBuckets { buckets })
}
