//! Changelog lock service
//!
//! Guards against two runs generating into the same output root at the
//! same time. The lock is held for the whole grouping/output pass and
//! released on every exit path.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::{SiltError, SiltResult};

const LOCK_FILE_NAME: &str = ".silt.lock";

/// Run-wide mutual exclusion over an output target
pub trait LockService {
    /// Acquire the lock, failing if another run holds it
    fn wait_for_lock(&mut self) -> SiltResult<()>;

    /// Release the lock if held
    fn release_lock(&mut self) -> SiltResult<()>;
}

/// Advisory lock file under the output root.
///
/// Acquisition creates the file exclusively; a leftover file from a
/// crashed run must be removed by the operator before a new run starts.
pub struct FileLockService {
    lock_path: PathBuf,
    held: bool,
}

impl FileLockService {
    pub fn new(output_root: &Path) -> Self {
        Self {
            lock_path: output_root.join(LOCK_FILE_NAME),
            held: false,
        }
    }

    /// Path of the lock file, surfaced in errors and logs
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }
}

impl LockService for FileLockService {
    fn wait_for_lock(&mut self) -> SiltResult<()> {
        if let Some(parent) = self.lock_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let result = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.lock_path);
        match result {
            Ok(mut file) => {
                writeln!(file, "locked at {}", Utc::now().to_rfc3339())?;
                self.held = true;
                tracing::debug!("Acquired changelog lock at {}", self.lock_path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(SiltError::LockAcquisition(format!(
                    "lock file {} already exists; another run may be in progress",
                    self.lock_path.display()
                )))
            }
            Err(e) => Err(SiltError::Io(e)),
        }
    }

    fn release_lock(&mut self) -> SiltResult<()> {
        if !self.held {
            return Ok(());
        }
        fs::remove_file(&self.lock_path)?;
        self.held = false;
        tracing::debug!("Released changelog lock at {}", self.lock_path.display());
        Ok(())
    }
}
