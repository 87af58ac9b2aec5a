//! CLI error type

use crate::export::ExportError;
use crate::import::ImportError;
use crate::validation::ValidationError;
use std::path::PathBuf;

/// Error surfaced by a CLI command
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read {0}: {1}")]
    FileReadError(PathBuf, String),
    #[error("Failed to write {0}: {1}")]
    FileWriteError(PathBuf, String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
