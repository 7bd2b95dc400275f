//! The splitting engine: load, scan, then build and save one workbook per chunk.
//!
//! The engine is synchronous and UI-free. It talks to the outside world only
//! through an [`EventSink`] and a [`CancellationToken`] that is polled at chunk
//! boundaries, so a chunk in progress always finishes (or fails) as a unit.

use crate::copier::{CellCopier, SourceSheet, copy_column_widths};
use crate::error::{SplitError, SplitOutcome};
use crate::log_slow_operation;
use crate::merges::reanchor_merges;
use crate::model::{NoDataPolicy, ProgressUpdate, SplitEvent, SplitParams, SplitResult};
use crate::planner::{ChunkPlan, ChunkWindow, header_only_file_name, plan_chunks};
use crate::utils::input_basename;
use crate::validation::{validate_chunk_size, validate_header_rows};
use parking_lot::Mutex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use umya_spreadsheet::Spreadsheet;

const SLOW_SAVE_THRESHOLD_MS: u64 = 2_000;

pub const EMPTY_SHEET_MESSAGE: &str = "Input file's active sheet was empty.";
pub const CANCELLED_MESSAGE: &str = "Operation cancelled.";

/// Receives engine events in emission order.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: SplitEvent);
}

impl EventSink for mpsc::Sender<SplitEvent> {
    fn emit(&self, event: SplitEvent) {
        // Must be called off the async runtime; the worker runs on a blocking thread.
        if self.blocking_send(event).is_err() {
            tracing::debug!("event receiver dropped; discarding event");
        }
    }
}

/// Buffers events in memory. Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<SplitEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SplitEvent> {
        self.events.lock().clone()
    }

    pub fn progress(&self) -> Vec<ProgressUpdate> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                SplitEvent::Progress(update) => Some(update.clone()),
                SplitEvent::Finished(_) => None,
            })
            .collect()
    }

    pub fn finished(&self) -> Vec<SplitResult> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                SplitEvent::Finished(result) => Some(result.clone()),
                SplitEvent::Progress(_) => None,
            })
            .collect()
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: SplitEvent) {
        self.events.lock().push(event);
    }
}

/// What a dry run learns about the input without writing anything.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub input: String,
    pub sheet_name: String,
    pub total_rows: u32,
    pub max_col: u32,
    pub merged_ranges: usize,
    pub distinct_styles: usize,
    pub auto_filter: Option<String>,
    pub plan: ChunkPlan,
    pub planned_files: Vec<String>,
}

/// One output workbook waiting to be built.
#[derive(Debug, Clone, Copy)]
enum ChunkJob {
    HeadersOnly { header_rows: u32 },
    Window { header_rows: u32, window: ChunkWindow },
}

impl ChunkJob {
    fn file_name(&self, basename: &str) -> String {
        match self {
            ChunkJob::HeadersOnly { header_rows } => header_only_file_name(basename, *header_rows),
            ChunkJob::Window { window, .. } => window.output_file_name(basename),
        }
    }

    fn bounds(&self) -> (u32, u32) {
        match self {
            ChunkJob::HeadersOnly { header_rows } => (1, *header_rows),
            ChunkJob::Window { window, .. } => (window.start, window.end),
        }
    }
}

enum Outcome {
    Completed,
    Cancelled,
    EmptySheet,
}

pub struct SplitEngine {
    params: SplitParams,
}

impl SplitEngine {
    pub fn new(params: SplitParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SplitParams {
        &self.params
    }

    /// Runs the whole split and returns the terminal result, which is also the
    /// last event emitted on `sink`.
    pub fn run(&self, sink: &dyn EventSink, cancel: &CancellationToken) -> SplitResult {
        let started = Instant::now();
        let span = tracing::info_span!(
            "split",
            input = %self.params.input.display(),
            copy_method = %self.params.copy_method,
        );
        let _entered = span.enter();

        let mut output_files = Vec::new();
        let result = match self.execute(sink, cancel, &mut output_files) {
            Ok(Outcome::Completed) => {
                let message = format!("Successfully created {} files.", output_files.len());
                SplitResult::success(message, output_files)
            }
            Ok(Outcome::EmptySheet) => SplitResult::success(EMPTY_SHEET_MESSAGE, output_files),
            Ok(Outcome::Cancelled) => SplitResult::cancelled(CANCELLED_MESSAGE, output_files),
            Err(error) => {
                tracing::error!(
                    error_code = %error.code(),
                    category = error.code().category(),
                    files_created = output_files.len(),
                    "{}",
                    error
                );
                SplitResult::error(error.to_string(), output_files)
            }
        };

        tracing::info!(
            state = "finished",
            status = %result.status,
            files_created = result.files_created,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "{}",
            result.message
        );
        sink.emit(SplitEvent::Finished(result.clone()));
        result
    }

    /// Loads and plans without writing any output.
    pub fn prescan(&self) -> SplitOutcome<ScanReport> {
        self.check_params()?;
        let book = self.load()?;
        let sheet = first_sheet(&book)?;
        let source = SourceSheet::new(sheet);
        let plan = plan_chunks(source.total_rows, self.params.header_rows, self.params.chunk_size);
        let basename = input_basename(&self.params.input);

        let planned_files = match &plan {
            ChunkPlan::Empty => Vec::new(),
            ChunkPlan::HeadersOnly { header_rows } => match self.params.no_data_policy {
                NoDataPolicy::HeaderOnly => vec![header_only_file_name(&basename, *header_rows)],
                NoDataPolicy::Error => Vec::new(),
            },
            ChunkPlan::Chunks { windows, .. } => windows
                .iter()
                .map(|window| window.output_file_name(&basename))
                .collect(),
        };

        Ok(ScanReport {
            input: self.params.input.display().to_string(),
            sheet_name: source.title.clone(),
            total_rows: source.total_rows,
            max_col: source.max_col,
            merged_ranges: source.merges.len(),
            distinct_styles: source.distinct_styles(),
            auto_filter: source.auto_filter.clone(),
            plan,
            planned_files,
        })
    }

    fn execute(
        &self,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
        output_files: &mut Vec<PathBuf>,
    ) -> SplitOutcome<Outcome> {
        self.check_params()?;
        let book = self.load()?;

        let sheet = first_sheet(&book)?;
        let source = SourceSheet::new(sheet);
        tracing::info!(
            state = "scanning",
            sheet = %source.title,
            total_rows = source.total_rows,
            max_col = source.max_col,
            merged_ranges = source.merges.len(),
            comments = source.comment_count(),
            "scanned source sheet"
        );

        let plan = plan_chunks(
            source.total_rows,
            self.params.header_rows,
            self.params.chunk_size,
        );
        let jobs = match plan {
            ChunkPlan::Empty => return Ok(Outcome::EmptySheet),
            ChunkPlan::HeadersOnly { header_rows } => match self.params.no_data_policy {
                NoDataPolicy::HeaderOnly => {
                    tracing::info!(
                        header_rows,
                        "no data rows after headers; writing a header-only workbook"
                    );
                    vec![ChunkJob::HeadersOnly { header_rows }]
                }
                NoDataPolicy::Error => return Err(SplitError::NoDataRows { header_rows }),
            },
            ChunkPlan::Chunks {
                header_rows,
                windows,
            } => windows
                .into_iter()
                .map(|window| ChunkJob::Window {
                    header_rows,
                    window,
                })
                .collect(),
        };

        let basename = input_basename(&self.params.input);
        let total = jobs.len() as u32;
        let mut copier = CellCopier::new(self.params.copy_method, self.params.preserve_formulas);

        for (idx, job) in jobs.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::info!(
                    chunk = idx + 1,
                    files_created = output_files.len(),
                    "cancellation requested; stopping before next chunk"
                );
                return Ok(Outcome::Cancelled);
            }

            let step = idx as u32 + 1;
            let (start, end) = job.bounds();
            sink.emit(SplitEvent::Progress(ProgressUpdate {
                step,
                total,
                status: format!("Processing chunk {step}/{total} (rows {start}-{end})"),
            }));

            let path = self.params.output_dir.join(job.file_name(&basename));
            let output = build_chunk(&source, &mut copier, step, job, &path)?;
            if let Some((hits, misses)) = copier.cache_stats() {
                tracing::debug!(chunk = step, hits, misses, "style cache usage");
            }

            save_chunk(&output, step, &path)?;
            output_files.push(path);
        }

        Ok(Outcome::Completed)
    }

    /// Rejects parameters the CLI would have refused, for library callers.
    fn check_params(&self) -> SplitOutcome<()> {
        validate_chunk_size(self.params.chunk_size)?;
        validate_header_rows(self.params.header_rows)?;
        Ok(())
    }

    fn load(&self) -> SplitOutcome<Spreadsheet> {
        let started = Instant::now();
        tracing::info!(
            state = "loading",
            path = %self.params.input.display(),
            preserve_formulas = self.params.preserve_formulas,
            "loading source workbook"
        );
        let book = umya_spreadsheet::reader::xlsx::read(&self.params.input)
            .map_err(SplitError::load)?;
        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "source workbook loaded"
        );
        Ok(book)
    }
}

fn first_sheet(book: &Spreadsheet) -> SplitOutcome<&umya_spreadsheet::Worksheet> {
    book.get_sheet(&0)
        .ok_or_else(|| SplitError::load("workbook contains no worksheets"))
}

/// Builds one output workbook: headers first, then the job's data window.
fn build_chunk(
    source: &SourceSheet<'_>,
    copier: &mut CellCopier,
    chunk: u32,
    job: &ChunkJob,
    path: &Path,
) -> SplitOutcome<Spreadsheet> {
    let (start, end) = job.bounds();
    tracing::info!(
        state = "building",
        chunk,
        start,
        end,
        path = %path.display(),
        "building chunk"
    );

    let mut book = umya_spreadsheet::new_file_empty_worksheet();
    let target = book
        .new_sheet(source.title.as_str())
        .map_err(|message| SplitError::save(path, message))?;

    if let Some(range) = &source.auto_filter {
        target.set_auto_filter(range.as_str());
    }
    copy_column_widths(source, target, source.max_col);
    copier.begin_chunk();

    let header_rows = match job {
        ChunkJob::HeadersOnly { header_rows } | ChunkJob::Window { header_rows, .. } => {
            *header_rows
        }
    };
    for row in 1..=header_rows {
        copier.copy_row(source, target, row, row, source.max_col);
    }
    let mut merges = reanchor_merges(&source.merges, target, 1, header_rows, 0);

    if let ChunkJob::Window { window, .. } = job {
        for (i, src_row) in (window.start..=window.end).enumerate() {
            copier.copy_row(source, target, src_row, header_rows + 1 + i as u32, source.max_col);
        }
        let offset = window.start - (header_rows + 1);
        let data = reanchor_merges(&source.merges, target, window.start, window.end, offset);
        merges.created += data.created;
        merges.dropped_partial += data.dropped_partial;
        merges.conflicts += data.conflicts;
    }

    tracing::debug!(
        chunk,
        merges_created = merges.created,
        merges_dropped = merges.dropped_partial,
        merge_conflicts = merges.conflicts,
        style_strategy = copier.strategy_name(),
        "chunk built"
    );
    Ok(book)
}

fn save_chunk(book: &Spreadsheet, chunk: u32, path: &Path) -> SplitOutcome<()> {
    let started = Instant::now();
    tracing::info!(state = "saving", chunk, path = %path.display(), "saving chunk");
    umya_spreadsheet::writer::xlsx::write(book, path).map_err(|err| SplitError::save(path, err))?;
    log_slow_operation!(
        started.elapsed(),
        SLOW_SAVE_THRESHOLD_MS,
        chunk,
        path = %path.display(),
        "chunk saved"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CopyMethod, SplitStatus};

    fn params(input: PathBuf, output_dir: PathBuf) -> SplitParams {
        SplitParams {
            input,
            output_dir,
            chunk_size: 10,
            header_rows: 1,
            preserve_formulas: false,
            copy_method: CopyMethod::Optimized,
            no_data_policy: NoDataPolicy::HeaderOnly,
        }
    }

    #[test]
    fn missing_input_finishes_with_single_error_event() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("absent.xlsx");
        let engine = SplitEngine::new(params(input, dir.path().to_path_buf()));
        let sink = CollectingSink::new();

        let result = engine.run(&sink, &CancellationToken::new());

        assert_eq!(result.status, SplitStatus::Error);
        assert!(result.message.starts_with("Error loading Excel file"));
        assert_eq!(result.files_created, 0);
        assert!(sink.progress().is_empty());
        assert_eq!(sink.finished(), vec![result]);
    }

    #[test]
    fn zero_chunk_size_is_rejected_before_loading() {
        let dir = tempfile::tempdir().unwrap();
        let mut params = params(dir.path().join("absent.xlsx"), dir.path().to_path_buf());
        params.chunk_size = 0;
        let engine = SplitEngine::new(params);
        let sink = CollectingSink::new();

        let result = engine.run(&sink, &CancellationToken::new());

        assert_eq!(result.status, SplitStatus::Error);
        assert!(result.message.contains("chunk_size"), "{}", result.message);
        assert_eq!(result.files_created, 0);
        assert!(sink.progress().is_empty());

        let err = engine.prescan().unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::InvalidParameter);
    }

    #[test]
    fn job_bounds_and_names() {
        let headers = ChunkJob::HeadersOnly { header_rows: 5 };
        assert_eq!(headers.bounds(), (1, 5));
        assert_eq!(headers.file_name("X"), "X_rows_1-5.xlsx");

        let window = ChunkJob::Window {
            header_rows: 1,
            window: ChunkWindow {
                index: 0,
                start: 2,
                end: 11,
            },
        };
        assert_eq!(window.file_name("X"), "X_rows_2-11.xlsx");
    }
}
