//! Input validation guards for split parameters and file-system inputs.

use std::fs;
use std::path::Path;
use thiserror::Error;

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validation error types
///
/// Raised before any work starts, so a bad parameter never produces a
/// partially split workbook.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Numeric parameter is outside valid range
    #[error("parameter '{parameter}' value {value} is outside valid range [{min}, {max}]")]
    NumericOutOfRange {
        parameter: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Input workbook is missing, not a file, or has the wrong extension
    #[error("invalid input workbook '{path}': {reason}")]
    InvalidWorkbook { path: String, reason: String },

    /// Output directory is missing or cannot be written
    #[error("invalid output directory '{path}': {reason}")]
    InvalidOutputDir { path: String, reason: String },
}

/// Validates that a numeric parameter is within a specified range
///
/// # Examples
///
/// ```
/// use sheet_splitter::validation::validate_numeric_range;
///
/// assert!(validate_numeric_range("chunk_size", 10u32, 1, 100).is_ok());
/// assert!(validate_numeric_range("chunk_size", 0u32, 1, 100).is_err());
/// ```
pub fn validate_numeric_range<T>(
    parameter_name: &str,
    value: T,
    min: T,
    max: T,
) -> ValidationResult<T>
where
    T: PartialOrd + Copy + Into<i64>,
{
    if value < min || value > max {
        Err(ValidationError::NumericOutOfRange {
            parameter: parameter_name.to_string(),
            value: value.into(),
            min: min.into(),
            max: max.into(),
        })
    } else {
        Ok(value)
    }
}

/// Validates that the input path is an existing `.xlsx` file.
pub fn validate_input_workbook(path: &Path) -> ValidationResult<&Path> {
    let invalid = |reason: &str| ValidationError::InvalidWorkbook {
        path: path.display().to_string(),
        reason: reason.to_string(),
    };

    if !path.exists() {
        return Err(invalid("file does not exist"));
    }
    if !path.is_file() {
        return Err(invalid("not a regular file"));
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    if ext.as_deref() != Some("xlsx") {
        return Err(invalid("only .xlsx workbooks are supported"));
    }
    Ok(path)
}

/// Validates that the output directory exists and accepts new files.
pub fn validate_output_dir(path: &Path) -> ValidationResult<&Path> {
    let invalid = |reason: String| ValidationError::InvalidOutputDir {
        path: path.display().to_string(),
        reason,
    };

    if !path.exists() {
        return Err(invalid("directory does not exist".to_string()));
    }
    if !path.is_dir() {
        return Err(invalid("not a directory".to_string()));
    }
    let metadata = fs::metadata(path).map_err(|e| invalid(e.to_string()))?;
    if metadata.permissions().readonly() {
        return Err(invalid("directory is read-only".to_string()));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_numeric_range() {
        assert!(validate_numeric_range("limit", 50u32, 1u32, 100u32).is_ok());
        assert!(validate_numeric_range("limit", 1u32, 1u32, 100u32).is_ok());
        assert!(validate_numeric_range("limit", 100u32, 1u32, 100u32).is_ok());
        assert!(validate_numeric_range("limit", 0u32, 1u32, 100u32).is_err());
        assert!(validate_numeric_range("limit", 101u32, 1u32, 100u32).is_err());
    }

    #[test]
    fn out_of_range_message_names_parameter() {
        let err = validate_numeric_range("chunk_size", 0u32, 1, 10).unwrap_err();
        assert_eq!(
            err.to_string(),
            "parameter 'chunk_size' value 0 is outside valid range [1, 10]"
        );
    }

    #[test]
    fn input_workbook_requires_xlsx_file() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("data.csv");
        fs::write(&csv, b"a,b").unwrap();
        assert!(validate_input_workbook(&csv).is_err());
        assert!(validate_input_workbook(&dir.path().join("missing.xlsx")).is_err());
        assert!(validate_input_workbook(dir.path()).is_err());

        let xlsx = dir.path().join("Data.XLSX");
        fs::write(&xlsx, b"stub").unwrap();
        assert!(validate_input_workbook(&xlsx).is_ok());
    }

    #[test]
    fn output_dir_must_be_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate_output_dir(dir.path()).is_ok());

        let file = dir.path().join("file.txt");
        fs::write(&file, b"x").unwrap();
        assert!(validate_output_dir(&file).is_err());
        assert!(validate_output_dir(&dir.path().join("nope")).is_err());
    }
}
