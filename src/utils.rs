use chrono::{DateTime, SecondsFormat, Utc};
use std::path::Path;

pub fn column_number_to_name(column: u32) -> String {
    let mut column = column;
    let mut name = String::new();
    while column > 0 {
        let rem = ((column - 1) % 26) as u8;
        name.insert(0, (b'A' + rem) as char);
        column = (column - 1) / 26;
    }
    name
}

pub fn cell_address(column: u32, row: u32) -> String {
    format!("{}{}", column_number_to_name(column), row)
}

/// A1-style address for a rectangle; single cells collapse to one address.
pub fn range_address(min_col: u32, min_row: u32, max_col: u32, max_row: u32) -> String {
    let start = cell_address(min_col, min_row);
    let end = cell_address(max_col, max_row);
    if start == end {
        start
    } else {
        format!("{start}:{end}")
    }
}

/// File stem used as the prefix of every output workbook.
pub fn input_basename(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "workbook".to_string())
}

pub fn to_rfc3339(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn path_to_forward_slashes(path: &Path) -> String {
    let raw = path.to_string_lossy();
    if raw.contains('\\') {
        raw.replace('\\', "/")
    } else {
        raw.into_owned()
    }
}
