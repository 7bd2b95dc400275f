//! Merged-range re-anchoring.
//!
//! A merge survives into a chunk only when it lies entirely inside the row
//! window being copied; a merge straddling two windows cannot be represented
//! once the rows live in different files, so it is dropped.

use crate::error::{SplitError, SplitOutcome};
use crate::utils::range_address;
use crate::validation::{validate_column_1based, validate_row_1based};
use std::fmt;
use umya_spreadsheet::Worksheet;
use umya_spreadsheet::helper::coordinate::index_from_coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MergedRange {
    pub min_row: u32,
    pub max_row: u32,
    pub min_col: u32,
    pub max_col: u32,
}

impl MergedRange {
    /// Parses `A1:C3` (or a lone `B2`) into a normalized rectangle.
    pub fn parse(range: &str) -> Option<Self> {
        let (start, end) = range.split_once(':').unwrap_or((range, range));
        let (start_col, start_row) = parse_cell(start)?;
        let (end_col, end_row) = parse_cell(end)?;
        Some(Self {
            min_row: start_row.min(end_row),
            max_row: start_row.max(end_row),
            min_col: start_col.min(end_col),
            max_col: start_col.max(end_col),
        })
    }

    pub fn address(&self) -> String {
        range_address(self.min_col, self.min_row, self.max_col, self.max_row)
    }

    pub fn within_rows(&self, min_row: u32, max_row: u32) -> bool {
        self.min_row >= min_row && self.max_row <= max_row
    }

    pub fn touches_rows(&self, min_row: u32, max_row: u32) -> bool {
        self.min_row <= max_row && self.max_row >= min_row
    }

    pub fn overlaps(&self, other: &MergedRange) -> bool {
        self.min_row <= other.max_row
            && self.max_row >= other.min_row
            && self.min_col <= other.max_col
            && self.max_col >= other.min_col
    }

    /// Moves the range up by `offset` rows; columns are unchanged.
    pub fn shifted_up(&self, offset: u32) -> Self {
        Self {
            min_row: self.min_row - offset,
            max_row: self.max_row - offset,
            ..*self
        }
    }
}

impl fmt::Display for MergedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address())
    }
}

fn parse_cell(address: &str) -> Option<(u32, u32)> {
    let address = address.trim();
    if address.is_empty() {
        return None;
    }
    let (col, row, _, _) = index_from_coordinate(address);
    let (col, row) = (col?, row?);
    validate_column_1based(col, "merge column").ok()?;
    validate_row_1based(row, "merge row").ok()?;
    Some((col, row))
}

/// Reads the merged ranges of a sheet, skipping any that cannot be parsed.
pub fn sheet_merges(sheet: &Worksheet) -> Vec<MergedRange> {
    sheet
        .get_merge_cells()
        .iter()
        .filter_map(|range| {
            let address = range.get_range();
            let parsed = MergedRange::parse(&address);
            if parsed.is_none() {
                tracing::warn!(range = %address, "ignoring unparseable merged range");
            }
            parsed
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub created: usize,
    pub dropped_partial: usize,
    pub conflicts: usize,
}

/// Creates `range` on the target unless it overlaps a merge already there.
pub fn try_merge(target: &mut Worksheet, range: MergedRange) -> SplitOutcome<()> {
    if let Some(existing) = sheet_merges(target)
        .into_iter()
        .find(|existing| existing.overlaps(&range))
    {
        return Err(SplitError::MergeConflict {
            range: range.address(),
            existing: existing.address(),
        });
    }
    target.add_merge_cells(range.address());
    Ok(())
}

/// Recreates every source merge fully inside `[window_min_row, window_max_row]`
/// on the target, shifted up by `row_offset`.
///
/// Failures are logged and skipped; a merge never aborts a chunk.
pub fn reanchor_merges(
    source_merges: &[MergedRange],
    target: &mut Worksheet,
    window_min_row: u32,
    window_max_row: u32,
    row_offset: u32,
) -> MergeReport {
    let mut report = MergeReport::default();

    for merge in source_merges {
        if !merge.touches_rows(window_min_row, window_max_row) {
            continue;
        }
        if !merge.within_rows(window_min_row, window_max_row) {
            report.dropped_partial += 1;
            tracing::warn!(
                range = %merge,
                window_start = window_min_row,
                window_end = window_max_row,
                "dropping merged range that crosses the row window"
            );
            continue;
        }

        let shifted = merge.shifted_up(row_offset);
        match try_merge(target, shifted) {
            Ok(()) => report.created += 1,
            Err(error) => {
                report.conflicts += 1;
                tracing::warn!(
                    source_range = %merge,
                    error_code = %error.code(),
                    "Warning: {}",
                    error
                );
            }
        }
    }

    report
}
