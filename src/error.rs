//! Error taxonomy for a split run
//!
//! Every fatal condition inside the engine maps to one [`SplitError`], which the
//! engine turns into exactly one terminal error result. Cosmetic failures
//! (a merge that cannot be recreated) use the same type but are only logged.

use crate::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Stable error codes surfaced in logs and JSON summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Source workbook missing, corrupt, or unreadable
    LoadFailed,
    /// Every row of the sheet is a header row
    NoDataRows,
    /// An output workbook could not be written
    SaveFailed,
    /// A merged range could not be recreated in a chunk
    MergeConflict,
    /// A parameter failed validation
    InvalidParameter,
    /// The worker ended without reporting a result
    WorkerTerminated,
}

impl ErrorCode {
    /// Get the error category for structured logs
    pub fn category(&self) -> &'static str {
        match self {
            ErrorCode::LoadFailed | ErrorCode::SaveFailed => "io_error",
            ErrorCode::NoDataRows | ErrorCode::InvalidParameter => "validation_error",
            ErrorCode::MergeConflict => "cosmetic",
            ErrorCode::WorkerTerminated => "server_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCode::LoadFailed => "load_failed",
            ErrorCode::NoDataRows => "no_data_rows",
            ErrorCode::SaveFailed => "save_failed",
            ErrorCode::MergeConflict => "merge_conflict",
            ErrorCode::InvalidParameter => "invalid_parameter",
            ErrorCode::WorkerTerminated => "worker_terminated",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum SplitError {
    #[error("Error loading Excel file: {message}")]
    Load { message: String },

    #[error("no data rows to process: all {header_rows} rows are header rows")]
    NoDataRows { header_rows: u32 },

    #[error("Error saving {}: {message}", path.display())]
    Save { path: PathBuf, message: String },

    #[error("could not merge range {range}: overlaps existing merge {existing}")]
    MergeConflict { range: String, existing: String },

    #[error(transparent)]
    InvalidParameter(#[from] ValidationError),

    #[error("The worker thread terminated unexpectedly.")]
    WorkerTerminated,
}

impl SplitError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SplitError::Load { .. } => ErrorCode::LoadFailed,
            SplitError::NoDataRows { .. } => ErrorCode::NoDataRows,
            SplitError::Save { .. } => ErrorCode::SaveFailed,
            SplitError::MergeConflict { .. } => ErrorCode::MergeConflict,
            SplitError::InvalidParameter(_) => ErrorCode::InvalidParameter,
            SplitError::WorkerTerminated => ErrorCode::WorkerTerminated,
        }
    }

    pub fn load(err: impl fmt::Display) -> Self {
        SplitError::Load {
            message: err.to_string(),
        }
    }

    pub fn save(path: impl Into<PathBuf>, err: impl fmt::Display) -> Self {
        SplitError::Save {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

pub type SplitOutcome<T> = Result<T, SplitError>;
