//! Update facade
//!
//! Ties the pieces together for one run: load and validate the changelog,
//! take the run-wide lock, group changesets by directory, and drive one
//! output session per bucket. The lock is released on every exit path; a
//! release failure is logged and never masks the run's own outcome.

use std::path::{Path, PathBuf};

use crate::changelog::changeset::{ChangeLog, ChangeSet};
use crate::changelog::filter::{ChangeSetFilter, ContextFilter, LabelFilter};
use crate::changelog::grouping::group_by_directory;
use crate::changelog::loader::{load_changelog, validate_changelog};
use crate::changelog::visitor::{ChangeSetVisitor, Direction, UpdateVisitor};
use crate::config::UpdateOptions;
use crate::error::{SiltError, SiltResult};
use crate::lock::{FileLockService, LockService};
use crate::session::{OutputSession, RunContext};

/// Summary of one update-with-directory-grouping run
#[derive(Debug)]
pub struct UpdateReport {
    /// Directory buckets processed
    pub buckets: usize,
    /// Changesets visited (SQL generated)
    pub visited: usize,
    /// Changesets routed to the skip path
    pub skipped: usize,
    /// Output files written, in bucket order
    pub files_written: Vec<PathBuf>,
}

/// Entry point for per-directory SQL generation over a changelog
#[derive(Debug)]
pub struct Updater {
    changelog: ChangeLog,
}

impl Updater {
    /// Load and validate the changelog from its master file
    pub fn from_file(changelog_file: &Path) -> SiltResult<Self> {
        Ok(Self {
            changelog: load_changelog(changelog_file)?,
        })
    }

    /// Build an updater over an already-assembled changelog
    pub fn new(changelog: ChangeLog) -> SiltResult<Self> {
        validate_changelog(&changelog)?;
        Ok(Self { changelog })
    }

    pub fn changelog(&self) -> &ChangeLog {
        &self.changelog
    }

    /// Generate update SQL grouped by source directory, guarded by a lock
    /// file under the output root.
    pub fn update_with_directory_grouping(&self, opts: &UpdateOptions) -> SiltResult<UpdateReport> {
        let mut lock = FileLockService::new(&opts.output_directory);
        let mut visitor = UpdateVisitor::new();
        self.run_with(opts, &mut visitor, &mut lock)
    }

    /// Same run with a caller-supplied visitor and lock service.
    ///
    /// A visitor with `Direction::Reverse` sees the changelog in reversed
    /// order; the reversal happens before grouping, so bucket order
    /// follows first encounter in the reversed sequence.
    pub fn run_with(
        &self,
        opts: &UpdateOptions,
        visitor: &mut dyn ChangeSetVisitor,
        lock: &mut dyn LockService,
    ) -> SiltResult<UpdateReport> {
        if opts.output_directory.as_os_str().is_empty() {
            return Err(SiltError::Configuration(
                "output directory must not be empty".to_string(),
            ));
        }

        lock.wait_for_lock()?;
        let result = self.run_grouped(opts, visitor);
        // A release failure must not mask the run's own outcome.
        if let Err(e) = lock.release_lock() {
            tracing::error!("Could not release changelog lock: {}", e);
        }
        result
    }

    fn run_grouped(
        &self,
        opts: &UpdateOptions,
        visitor: &mut dyn ChangeSetVisitor,
    ) -> SiltResult<UpdateReport> {
        let filters: Vec<Box<dyn ChangeSetFilter>> = vec![
            Box::new(ContextFilter::new(opts.contexts.clone())),
            Box::new(LabelFilter::new(opts.labels.clone())),
        ];

        let mut ordered: Vec<&ChangeSet> = self.changelog.change_sets.iter().collect();
        if visitor.direction() == Direction::Reverse {
            ordered.reverse();
        }
        let buckets = group_by_directory(&ordered)?;
        tracing::info!(
            "Processing {} directory bucket(s) as {}",
            buckets.len(),
            opts.output_encoding
        );

        let session = OutputSession::new(
            &opts.source_directory,
            &opts.output_directory,
            &opts.output_file,
        );
        let mut ctx = RunContext::new();
        for bucket in buckets.iter() {
            session.process_bucket(
                bucket,
                &self.changelog,
                &opts.database,
                visitor,
                &filters,
                &mut ctx,
            )?;
        }

        Ok(UpdateReport {
            buckets: buckets.len(),
            visited: ctx.visited,
            skipped: ctx.skipped,
            files_written: ctx.files_written,
        })
    }
}
