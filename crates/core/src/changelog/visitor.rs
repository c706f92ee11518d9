//! Changeset visitors
//!
//! A visitor is invoked once for every changeset accepted by the run's
//! filters; the skip callback sees everything else. Visitors produce SQL
//! through the executor bound to the current bucket's output file.

use super::changeset::{ChangeLog, ChangeSet};
use super::filter::FilterResult;
use crate::config::TargetDatabase;
use crate::error::SiltResult;
use crate::executor::RecordingExecutor;

/// Iteration direction over the changelog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Changelog order (update)
    Forward,
    /// Reversed changelog order (rollback-style generation)
    Reverse,
}

/// Callback invoked for each changeset while a run replays the changelog
pub trait ChangeSetVisitor {
    /// Order the changelog should be iterated in before grouping
    fn direction(&self) -> Direction;

    /// Called for a changeset every filter accepted and that has not been
    /// visited earlier in the run
    fn visit(
        &mut self,
        change_set: &ChangeSet,
        changelog: &ChangeLog,
        database: &TargetDatabase,
        accepted: &[FilterResult],
        executor: &mut RecordingExecutor,
    ) -> SiltResult<()>;

    /// Called for a changeset that was rejected by a filter or already
    /// visited. `denied` is empty when the skip is duplicate suppression.
    fn skipped(
        &mut self,
        _change_set: &ChangeSet,
        _changelog: &ChangeLog,
        _database: &TargetDatabase,
        _denied: &[FilterResult],
    ) {
    }
}

/// Forward visitor that renders each changeset as commented SQL
#[derive(Debug, Default)]
pub struct UpdateVisitor;

impl UpdateVisitor {
    pub fn new() -> Self {
        Self
    }
}

impl ChangeSetVisitor for UpdateVisitor {
    fn direction(&self) -> Direction {
        Direction::Forward
    }

    fn visit(
        &mut self,
        change_set: &ChangeSet,
        _changelog: &ChangeLog,
        database: &TargetDatabase,
        _accepted: &[FilterResult],
        executor: &mut RecordingExecutor,
    ) -> SiltResult<()> {
        tracing::debug!(
            "Writing changeset {} for database '{}'",
            change_set.display_id(),
            database.name
        );
        executor.comment(&format!("Changeset {}", change_set.display_id()))?;
        executor.execute(&change_set.sql)?;
        Ok(())
    }

    fn skipped(
        &mut self,
        change_set: &ChangeSet,
        _changelog: &ChangeLog,
        _database: &TargetDatabase,
        denied: &[FilterResult],
    ) {
        if denied.is_empty() {
            tracing::debug!("Skipping already-visited changeset {}", change_set.display_id());
        } else {
            let reasons: Vec<&str> = denied.iter().map(|r| r.reason.as_str()).collect();
            tracing::info!(
                "Skipping changeset {}: {}",
                change_set.display_id(),
                reasons.join("; ")
            );
        }
    }
}
