//! Run configuration for per-directory SQL generation

use std::fmt;
use std::path::PathBuf;

use crate::error::{SiltError, SiltResult};

/// Text encoding of generated SQL files.
///
/// Generated text is produced as UTF-8; other encoding names are rejected
/// at configuration time instead of silently mis-encoding output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputEncoding {
    #[default]
    Utf8,
}

impl OutputEncoding {
    /// Parse an encoding name as configured by the caller
    pub fn parse(name: &str) -> SiltResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "" | "utf8" | "utf-8" => Ok(OutputEncoding::Utf8),
            other => Err(SiltError::Configuration(format!(
                "unsupported output encoding '{}': only UTF-8 is supported",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputEncoding::Utf8 => write!(f, "UTF-8"),
        }
    }
}

/// Descriptor of the database the generated SQL targets.
///
/// Generation never connects anywhere; the descriptor only labels the
/// output and the logs.
#[derive(Debug, Clone)]
pub struct TargetDatabase {
    /// Short name recorded in generated file headers
    pub name: String,
}

impl Default for TargetDatabase {
    fn default() -> Self {
        Self {
            name: "offline".to_string(),
        }
    }
}

/// Options for one update-with-directory-grouping run
#[derive(Debug, Clone)]
pub struct UpdateOptions {
    /// Root directory generated SQL files are written under
    pub output_directory: PathBuf,
    /// Source root; its final path segment becomes the module segment of
    /// every output path
    pub source_directory: String,
    /// File name created in each bucket directory
    pub output_file: String,
    /// Encoding of generated files
    pub output_encoding: OutputEncoding,
    /// Context expressions forwarded to the context filter
    pub contexts: Vec<String>,
    /// Label expressions forwarded to the label filter
    pub labels: Vec<String>,
    /// Accepted for compatibility with the engine-level update surface;
    /// not interpreted by output generation
    pub drop_first: bool,
    /// Accepted for compatibility; not interpreted by output generation
    pub to_tag: Option<String>,
    /// Target database descriptor
    pub database: TargetDatabase,
}

impl UpdateOptions {
    pub fn new(
        output_directory: impl Into<PathBuf>,
        source_directory: impl Into<String>,
    ) -> Self {
        Self {
            output_directory: output_directory.into(),
            source_directory: source_directory.into(),
            output_file: "update.sql".to_string(),
            output_encoding: OutputEncoding::default(),
            contexts: Vec::new(),
            labels: Vec::new(),
            drop_first: false,
            to_tag: None,
            database: TargetDatabase::default(),
        }
    }
}
