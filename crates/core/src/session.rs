//! Output session management
//!
//! Drives one directory bucket at a time: derives the bucket's output
//! target, opens exactly one writable resource for it, replays the
//! bucket's changesets through filter/visit logic with duplicate
//! suppression, and flushes before the next bucket starts. The resource
//! is dropped on every exit path, so two bucket files are never open at
//! the same time.

use std::collections::HashSet;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::changelog::changeset::{ChangeLog, ChangeSetId};
use crate::changelog::filter::{ChangeSetFilter, FilterResult};
use crate::changelog::grouping::DirectoryBucket;
use crate::changelog::visitor::ChangeSetVisitor;
use crate::config::TargetDatabase;
use crate::error::{SiltError, SiltResult};
use crate::executor::RecordingExecutor;

/// Mutable state scoped to exactly one run, threaded through the session
/// by reference and discarded at run end
#[derive(Debug, Default)]
pub struct RunContext {
    seen: HashSet<ChangeSetId>,
    /// Changesets visited (accepted and not previously seen)
    pub visited: usize,
    /// Changesets routed to the skip path
    pub skipped: usize,
    /// Output files flushed so far, in bucket order
    pub files_written: Vec<PathBuf>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn already_seen(&self, id: &ChangeSetId) -> bool {
        self.seen.contains(id)
    }

    fn mark_seen(&mut self, id: ChangeSetId) {
        self.seen.insert(id);
    }
}

/// Compose the output file path for one bucket:
/// `output_root / module_segment / directory_key / output_file`,
/// where the module segment is the final path segment of the source root.
pub fn derive_output_target(
    source_root: &str,
    output_root: &Path,
    output_file: &str,
    directory_key: &str,
) -> PathBuf {
    let module = source_root
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("");
    let mut target = output_root.to_path_buf();
    if !module.is_empty() {
        target.push(module);
    }
    // A leading separator would re-root the composed path.
    let key = directory_key.trim_start_matches('/');
    if !key.is_empty() {
        target.push(key);
    }
    target.push(output_file);
    target
}

/// Processes directory buckets sequentially, one output resource each
pub struct OutputSession<'a> {
    source_root: &'a str,
    output_root: &'a Path,
    output_file: &'a str,
}

impl<'a> OutputSession<'a> {
    pub fn new(source_root: &'a str, output_root: &'a Path, output_file: &'a str) -> Self {
        Self {
            source_root,
            output_root,
            output_file,
        }
    }

    /// Replay one bucket into its output file.
    ///
    /// Filters are evaluated in order with fail-fast AND semantics; a
    /// changeset all filters accept is visited at most once per run, and
    /// everything else goes to the visitor's skip callback. The file is
    /// flushed before returning and closed on every exit path, including
    /// visitor errors.
    pub fn process_bucket(
        &self,
        bucket: &DirectoryBucket<'_>,
        changelog: &ChangeLog,
        database: &TargetDatabase,
        visitor: &mut dyn ChangeSetVisitor,
        filters: &[Box<dyn ChangeSetFilter>],
        ctx: &mut RunContext,
    ) -> SiltResult<()> {
        let target = derive_output_target(
            self.source_root,
            self.output_root,
            self.output_file,
            &bucket.directory,
        );
        tracing::info!(
            "Writing {} changeset(s) from {} to {}",
            bucket.change_sets.len(),
            bucket.directory,
            target.display()
        );

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| SiltError::OutputResource {
                path: target.clone(),
                source: e,
            })?;
        }
        let file = fs::File::create(&target).map_err(|e| SiltError::OutputResource {
            path: target.clone(),
            source: e,
        })?;
        let mut executor = RecordingExecutor::new(BufWriter::new(file));

        executor.comment(&format!("Source directory: {}", bucket.directory))?;
        executor.comment(&format!(
            "Generated for database '{}' at {}",
            database.name,
            Utc::now().to_rfc3339()
        ))?;

        for change_set in bucket.change_sets.iter().copied() {
            let mut accepted: Vec<FilterResult> = Vec::new();
            let mut denied: Vec<FilterResult> = Vec::new();
            let mut should_visit = true;
            for filter in filters {
                let result = filter.accepts(change_set);
                if result.accepted {
                    accepted.push(result);
                } else {
                    // Fail fast: remaining filters are not consulted.
                    should_visit = false;
                    denied.push(result);
                    break;
                }
            }

            if should_visit && !ctx.already_seen(&change_set.identity()) {
                visitor.visit(change_set, changelog, database, &accepted, &mut executor)?;
                ctx.mark_seen(change_set.identity());
                ctx.visited += 1;
            } else {
                visitor.skipped(change_set, changelog, database, &denied);
                ctx.skipped += 1;
            }
        }

        executor.flush()?;
        ctx.files_written.push(target);
        Ok(())
    }
}
