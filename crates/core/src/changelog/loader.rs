//! Changelog loading
//!
//! A master changelog lists the changeset files to include, in order;
//! each included file carries the changesets themselves. The logical
//! include path (as written in the master file) becomes the source
//! location of every changeset in that file and is what output grouping
//! keys on.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::changeset::{ChangeLog, ChangeSet, ChangeSetId};
use crate::error::{SiltError, SiltResult};

#[derive(Debug, Deserialize)]
struct MasterFile {
    include: Vec<IncludeEntry>,
}

#[derive(Debug, Deserialize)]
struct IncludeEntry {
    path: String,
}

#[derive(Debug, Deserialize)]
struct ChangeSetFile {
    changesets: Vec<ChangeSet>,
}

fn parse_error(path: &Path, message: impl Into<String>) -> SiltError {
    SiltError::ChangelogParse {
        path: path.display().to_string(),
        message: message.into(),
    }
}

/// Load and validate an ordered changelog from a master file.
///
/// Include paths are resolved relative to the master file's directory,
/// but the source location recorded on each changeset is the include
/// path exactly as written.
pub fn load_changelog(master_path: &Path) -> SiltResult<ChangeLog> {
    let text =
        fs::read_to_string(master_path).map_err(|e| parse_error(master_path, e.to_string()))?;
    let master: MasterFile =
        serde_yaml::from_str(&text).map_err(|e| parse_error(master_path, e.to_string()))?;

    let base = master_path.parent().unwrap_or_else(|| Path::new(""));
    let mut change_sets = Vec::new();
    for entry in &master.include {
        let file_path = base.join(&entry.path);
        let text =
            fs::read_to_string(&file_path).map_err(|e| parse_error(&file_path, e.to_string()))?;
        let parsed: ChangeSetFile =
            serde_yaml::from_str(&text).map_err(|e| parse_error(&file_path, e.to_string()))?;
        for mut change_set in parsed.changesets {
            change_set.source_path = entry.path.clone();
            change_sets.push(change_set);
        }
    }

    let changelog = ChangeLog::new(master_path.display().to_string(), change_sets);
    validate_changelog(&changelog)?;
    tracing::info!(
        "Loaded {} changeset(s) from {}",
        changelog.change_sets.len(),
        master_path.display()
    );
    Ok(changelog)
}

/// Check required fields and identity uniqueness across the changelog
pub fn validate_changelog(changelog: &ChangeLog) -> SiltResult<()> {
    let mut seen: HashSet<ChangeSetId> = HashSet::new();
    for change_set in &changelog.change_sets {
        if change_set.id.trim().is_empty() {
            return Err(SiltError::Validation(format!(
                "changeset in '{}' has an empty id",
                change_set.source_path
            )));
        }
        if change_set.author.trim().is_empty() {
            return Err(SiltError::Validation(format!(
                "changeset '{}' in '{}' has an empty author",
                change_set.id, change_set.source_path
            )));
        }
        if change_set.sql.trim().is_empty() {
            return Err(SiltError::Validation(format!(
                "changeset '{}' in '{}' has no SQL",
                change_set.id, change_set.source_path
            )));
        }
        if !seen.insert(change_set.identity()) {
            return Err(SiltError::Validation(format!(
                "duplicate changeset identity {}",
                change_set.display_id()
            )));
        }
    }
    Ok(())
}
