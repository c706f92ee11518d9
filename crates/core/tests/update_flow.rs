//! End-to-end tests for the directory-grouped update flow.
//!
//! These tests drive the full pipeline from a master changelog on disk to
//! generated per-directory SQL files in a temporary output root.

use std::fs;
use std::path::Path;

use silt_core::{
    FileLockService, LockService, SiltError, UpdateOptions, Updater,
};

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(path, content).expect("write");
}

/// Lay out a changelog with two source directories and three changesets.
fn write_sample_changelog(root: &Path) {
    write(
        &root.join("changelog.yaml"),
        "include:\n\
         \x20 - path: db/v1/tables.yaml\n\
         \x20 - path: db/v2/seed.yaml\n\
         \x20 - path: db/v1/indexes.yaml\n",
    );
    write(
        &root.join("db/v1/tables.yaml"),
        "changesets:\n\
         \x20 - id: create-users\n\
         \x20   author: ops\n\
         \x20   sql: CREATE TABLE users (id INT)\n",
    );
    write(
        &root.join("db/v2/seed.yaml"),
        "changesets:\n\
         \x20 - id: seed-users\n\
         \x20   author: ops\n\
         \x20   contexts: [prod]\n\
         \x20   sql: INSERT INTO users VALUES (1)\n",
    );
    write(
        &root.join("db/v1/indexes.yaml"),
        "changesets:\n\
         \x20 - id: index-users\n\
         \x20   author: ops\n\
         \x20   sql: CREATE INDEX idx_users ON users (id)\n",
    );
}

#[test]
fn writes_one_sql_file_per_source_directory() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source_root = dir.path().join("repos/service-a");
    write_sample_changelog(&source_root);
    let output_root = dir.path().join("out");

    let updater = Updater::from_file(&source_root.join("changelog.yaml")).expect("load");
    let opts = UpdateOptions::new(&output_root, source_root.to_string_lossy().to_string());
    let report = updater.update_with_directory_grouping(&opts).expect("run");

    assert_eq!(report.buckets, 2);
    assert_eq!(report.visited, 3);
    assert_eq!(report.skipped, 0);

    // Bucket order follows first-encounter order of directories.
    let v1 = output_root.join("service-a/db/v1/update.sql");
    let v2 = output_root.join("service-a/db/v2/update.sql");
    assert_eq!(report.files_written, vec![v1.clone(), v2.clone()]);

    let v1_sql = fs::read_to_string(&v1).expect("v1 output");
    assert!(v1_sql.contains("-- Changeset db/v1/tables.yaml::create-users::ops"));
    assert!(v1_sql.contains("CREATE TABLE users (id INT);"));
    assert!(v1_sql.contains("CREATE INDEX idx_users ON users (id);"));

    let v2_sql = fs::read_to_string(&v2).expect("v2 output");
    assert!(v2_sql.contains("INSERT INTO users VALUES (1);"));
    assert!(!v2_sql.contains("CREATE TABLE"));

    // Lock released after the run.
    assert!(!output_root.join(".silt.lock").exists());
}

#[test]
fn context_filter_skips_unmatched_changesets() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source_root = dir.path().join("repos/service-a");
    write_sample_changelog(&source_root);
    let output_root = dir.path().join("out");

    let updater = Updater::from_file(&source_root.join("changelog.yaml")).expect("load");
    let mut opts = UpdateOptions::new(&output_root, source_root.to_string_lossy().to_string());
    opts.contexts = vec!["dev".to_string()];
    let report = updater.update_with_directory_grouping(&opts).expect("run");

    // seed-users is restricted to the prod context.
    assert_eq!(report.visited, 2);
    assert_eq!(report.skipped, 1);
    let v2_sql = fs::read_to_string(output_root.join("service-a/db/v2/update.sql")).expect("v2");
    assert!(!v2_sql.contains("INSERT INTO users"));
}

#[test]
fn failed_bucket_aborts_run_but_keeps_earlier_files() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source_root = dir.path().join("repos/service-a");
    write_sample_changelog(&source_root);
    let output_root = dir.path().join("out");

    // Occupy db/v2 with a plain file so the second bucket's directory
    // cannot be created.
    write(&output_root.join("service-a/db/v2"), "in the way");

    let updater = Updater::from_file(&source_root.join("changelog.yaml")).expect("load");
    let opts = UpdateOptions::new(&output_root, source_root.to_string_lossy().to_string());
    let err = updater.update_with_directory_grouping(&opts).unwrap_err();
    assert!(matches!(err, SiltError::OutputResource { .. }));

    // The first bucket was flushed before the failure and stays on disk.
    let v1_sql = fs::read_to_string(output_root.join("service-a/db/v1/update.sql")).expect("v1");
    assert!(v1_sql.contains("CREATE TABLE users (id INT);"));
    assert!(!output_root.join("service-a/db/v2/update.sql").exists());

    // The lock is still released on the failure path.
    assert!(!output_root.join(".silt.lock").exists());
}

#[test]
fn held_lock_prevents_any_processing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source_root = dir.path().join("repos/service-a");
    write_sample_changelog(&source_root);
    let output_root = dir.path().join("out");

    let mut holder = FileLockService::new(&output_root);
    holder.wait_for_lock().expect("hold lock");

    let updater = Updater::from_file(&source_root.join("changelog.yaml")).expect("load");
    let opts = UpdateOptions::new(&output_root, source_root.to_string_lossy().to_string());
    let err = updater.update_with_directory_grouping(&opts).unwrap_err();
    assert!(matches!(err, SiltError::LockAcquisition(_)));
    assert!(!output_root.join("service-a").exists());

    holder.release_lock().expect("release");
}

#[test]
fn empty_output_directory_is_a_configuration_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source_root = dir.path().join("repos/service-a");
    write_sample_changelog(&source_root);

    let updater = Updater::from_file(&source_root.join("changelog.yaml")).expect("load");
    let opts = UpdateOptions::new("", source_root.to_string_lossy().to_string());
    let err = updater.update_with_directory_grouping(&opts).unwrap_err();
    assert!(matches!(err, SiltError::Configuration(_)));
}

#[test]
fn rerunning_overwrites_previous_output() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source_root = dir.path().join("repos/service-a");
    write_sample_changelog(&source_root);
    let output_root = dir.path().join("out");

    let updater = Updater::from_file(&source_root.join("changelog.yaml")).expect("load");
    let opts = UpdateOptions::new(&output_root, source_root.to_string_lossy().to_string());
    let first = updater.update_with_directory_grouping(&opts).expect("first run");
    let second = updater.update_with_directory_grouping(&opts).expect("second run");

    assert_eq!(first.visited, second.visited);
    let v1_sql = fs::read_to_string(output_root.join("service-a/db/v1/update.sql")).expect("v1");
    // One header per run, not appended.
    assert_eq!(v1_sql.matches("-- Source directory:").count(), 1);
}
