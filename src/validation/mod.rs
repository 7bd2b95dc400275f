//! Input validation and boundary checks.
//!
//! Every split parameter passes through here before the engine sees it:
//! - Excel row/column limits
//! - Chunk size and header row bounds
//! - Input workbook and output directory guards

pub mod bounds;
pub mod input_guards;

pub use bounds::{
    DEFAULT_CHUNK_SIZE, DEFAULT_EVENT_CAPACITY, DEFAULT_HEADER_ROWS, DEFAULT_POLL_INTERVAL_MS,
    EXCEL_MAX_COLUMNS, EXCEL_MAX_ROWS, validate_chunk_size, validate_column_1based,
    validate_header_rows, validate_row_1based,
};
pub use input_guards::{
    ValidationError, ValidationResult, validate_input_workbook, validate_numeric_range,
    validate_output_dir,
};
