//! Chunk planning: which source rows land in which output workbook.

use serde::Serialize;
use std::fmt;

/// One output workbook's data window in source coordinates (1-based, inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkWindow {
    pub index: u32,
    pub start: u32,
    pub end: u32,
}

impl ChunkWindow {
    pub fn rows(&self) -> u32 {
        self.end - self.start + 1
    }

    pub fn output_file_name(&self, basename: &str) -> String {
        format!("{basename}_rows_{}-{}.xlsx", self.start, self.end)
    }
}

impl fmt::Display for ChunkWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rows {}-{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChunkPlan {
    /// The sheet has no rows at all.
    Empty,
    /// Every row is a header row; there is nothing to distribute.
    HeadersOnly { header_rows: u32 },
    Chunks {
        header_rows: u32,
        windows: Vec<ChunkWindow>,
    },
}

impl ChunkPlan {
    pub fn header_rows(&self) -> u32 {
        match self {
            ChunkPlan::Empty => 0,
            ChunkPlan::HeadersOnly { header_rows } | ChunkPlan::Chunks { header_rows, .. } => {
                *header_rows
            }
        }
    }

    pub fn windows(&self) -> &[ChunkWindow] {
        match self {
            ChunkPlan::Chunks { windows, .. } => windows,
            _ => &[],
        }
    }

    pub fn num_chunks(&self) -> u32 {
        self.windows().len() as u32
    }
}

/// Name of the single workbook written when a sheet holds nothing but headers.
pub fn header_only_file_name(basename: &str, header_rows: u32) -> String {
    format!("{basename}_rows_1-{header_rows}.xlsx")
}

/// Clamps `header_rows` into `[0, total_rows]`.
pub fn clamp_header_rows(header_rows: u32, total_rows: u32) -> u32 {
    header_rows.min(total_rows)
}

/// Number of chunks needed for `data_rows` rows at `chunk_size` rows each.
pub fn chunk_count(data_rows: u32, chunk_size: u32) -> u32 {
    let chunk_size = u64::from(chunk_size.max(1));
    ((u64::from(data_rows) + chunk_size - 1) / chunk_size) as u32
}

/// Splits rows `header_rows+1..=total_rows` into contiguous windows of at most
/// `chunk_size` rows. A `chunk_size` of zero is treated as one.
pub fn plan_chunks(total_rows: u32, header_rows: u32, chunk_size: u32) -> ChunkPlan {
    if total_rows == 0 {
        return ChunkPlan::Empty;
    }

    let header_rows = clamp_header_rows(header_rows, total_rows);
    let data_rows = total_rows - header_rows;
    if data_rows == 0 {
        return ChunkPlan::HeadersOnly { header_rows };
    }

    let chunk_size = chunk_size.max(1);
    let num_chunks = chunk_count(data_rows, chunk_size);
    let windows = (0..num_chunks)
        .map(|i| {
            let offset = u64::from(i) * u64::from(chunk_size);
            let start = u64::from(header_rows) + offset + 1;
            let end = (u64::from(header_rows) + offset + u64::from(chunk_size))
                .min(u64::from(total_rows));
            ChunkWindow {
                index: i,
                start: start as u32,
                end: end as u32,
            }
        })
        .collect();

    ChunkPlan::Chunks {
        header_rows,
        windows,
    }
}
