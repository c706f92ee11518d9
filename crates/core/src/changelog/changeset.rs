//! Changeset definitions - core types for ordered database changelogs
//!
//! Defines the fundamental types used throughout the output generation
//! pipeline: ChangeSet, ChangeSetId, and ChangeLog.

use serde::{Deserialize, Serialize};

/// One versioned, ordered database-change step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Unique identifier within the owning source file
    pub id: String,
    /// Author recorded alongside the identifier
    pub author: String,
    /// Context tokens this changeset is restricted to (empty = always)
    #[serde(default)]
    pub contexts: Vec<String>,
    /// Label tokens this changeset is tagged with (empty = always)
    #[serde(default)]
    pub labels: Vec<String>,
    /// Literal SQL applied by this changeset
    pub sql: String,
    /// Logical path of the source file this changeset was loaded from.
    /// Assigned by the loader, never part of the file syntax.
    #[serde(skip)]
    pub source_path: String,
}

impl ChangeSet {
    /// Full identity of a changeset. Two changesets with the same triple
    /// are the same change regardless of where the run encounters them.
    pub fn identity(&self) -> ChangeSetId {
        ChangeSetId {
            id: self.id.clone(),
            author: self.author.clone(),
            source_path: self.source_path.clone(),
        }
    }

    /// `path::id::author` form used in logs and generated SQL comments
    pub fn display_id(&self) -> String {
        format!("{}::{}::{}", self.source_path, self.id, self.author)
    }
}

/// Identity triple used for duplicate-execution suppression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangeSetId {
    pub id: String,
    pub author: String,
    pub source_path: String,
}

/// An ordered changelog: every changeset in declaration order
#[derive(Debug, Clone)]
pub struct ChangeLog {
    /// Logical path of the master changelog file
    pub logical_path: String,
    /// Changesets in changelog order
    pub change_sets: Vec<ChangeSet>,
}

impl ChangeLog {
    pub fn new(logical_path: impl Into<String>, change_sets: Vec<ChangeSet>) -> Self {
        Self {
            logical_path: logical_path.into(),
            change_sets,
        }
    }
}
