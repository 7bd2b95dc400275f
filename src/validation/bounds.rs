//! Boundary checks for the numeric split parameters.
//!
//! Row limits come from the xlsx format itself; a parameter that could never
//! address a real row is rejected before the workbook is opened.

use super::input_guards::{ValidationResult, validate_numeric_range};

// ============================================================================
// Excel Limits (Microsoft Excel 2007+)
// ============================================================================

/// Maximum number of rows in an Excel worksheet (2^20)
pub const EXCEL_MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in an Excel worksheet (2^14)
pub const EXCEL_MAX_COLUMNS: u32 = 16_384;

// ============================================================================
// Split Parameter Limits
// ============================================================================

/// Smallest chunk that still carries data
pub const MIN_CHUNK_SIZE: u32 = 1;

/// Default number of data rows per output workbook
pub const DEFAULT_CHUNK_SIZE: u32 = 5_000;

/// Default number of header rows repeated in each chunk
pub const DEFAULT_HEADER_ROWS: u32 = 1;

/// Default poll interval of the control-surface loop
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Default capacity of the worker event channel
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

// ============================================================================
// Validation Functions
// ============================================================================

/// Validates the number of data rows per output workbook.
#[inline]
pub fn validate_chunk_size(chunk_size: u32) -> ValidationResult<u32> {
    validate_numeric_range("chunk_size", chunk_size, MIN_CHUNK_SIZE, EXCEL_MAX_ROWS)
}

/// Validates the requested header row count.
///
/// The count is clamped to the sheet's row count later, once the workbook is
/// open; here it only has to be addressable at all.
#[inline]
pub fn validate_header_rows(header_rows: u32) -> ValidationResult<u32> {
    validate_numeric_range("header_rows", header_rows, 0, EXCEL_MAX_ROWS)
}

/// Validates a 1-based row number.
#[inline]
pub fn validate_row_1based(row: u32, parameter: &str) -> ValidationResult<u32> {
    validate_numeric_range(parameter, row, 1, EXCEL_MAX_ROWS)
}

/// Validates a 1-based column number.
#[inline]
pub fn validate_column_1based(col: u32, parameter: &str) -> ValidationResult<u32> {
    validate_numeric_range(parameter, col, 1, EXCEL_MAX_COLUMNS)
}
