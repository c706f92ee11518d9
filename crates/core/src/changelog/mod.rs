//! Changelog model: changesets, loading, filters, visitors, and the
//! directory grouping pass

pub mod changeset;
pub mod filter;
pub mod grouping;
pub mod loader;
pub mod visitor;

pub use changeset::{ChangeLog, ChangeSet, ChangeSetId};
pub use filter::{ChangeSetFilter, ContextFilter, FilterResult, LabelFilter};
pub use grouping::{group_by_directory, DirectoryBucket, DirectoryBuckets};
pub use loader::{load_changelog, validate_changelog};
pub use visitor::{ChangeSetVisitor, Direction, UpdateVisitor};
