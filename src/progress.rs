//! Terminal rendering for the command-line front end.

use crate::config::SplitConfig;
use crate::engine::ScanReport;
use crate::model::{ProgressUpdate, SplitSummary};
use std::io::{self, Write};

const BAR_WIDTH: usize = 40;
const FILL: char = '█';
const EMPTY: char = '-';

/// `Progress: |█████-----| 33.3% (1/3) - Processing chunk 1/3 (rows 2-11)`
pub fn render_progress_line(update: &ProgressUpdate, width: usize) -> String {
    let total = update.total.max(1);
    let ratio = (f64::from(update.step) / f64::from(total)).clamp(0.0, 1.0);
    let filled = ((ratio * width as f64).floor() as usize).min(width);
    let bar: String = std::iter::repeat_n(FILL, filled)
        .chain(std::iter::repeat_n(EMPTY, width - filled))
        .collect();

    format!(
        "Progress: |{bar}| {:.1}% ({}/{}) - {}",
        ratio * 100.0,
        update.step,
        update.total,
        update.status
    )
}

/// Redraws one progress line in place on stdout.
#[derive(Debug)]
pub struct ProgressBar {
    width: usize,
    drawn: bool,
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self::new(BAR_WIDTH)
    }
}

impl ProgressBar {
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
            drawn: false,
        }
    }

    pub fn update(&mut self, update: &ProgressUpdate) {
        let line = render_progress_line(update, self.width);
        let mut stdout = io::stdout().lock();
        let _ = write!(stdout, "\r\x1b[2K{line}");
        let _ = stdout.flush();
        self.drawn = true;
    }

    /// Moves past the progress line so later output starts on a fresh row.
    pub fn finish(&mut self) {
        if self.drawn {
            println!();
            self.drawn = false;
        }
    }
}

pub fn render_settings(config: &SplitConfig) -> String {
    let formula_mode = if config.preserve_formulas {
        "preserve formulas"
    } else {
        "values only"
    };
    [
        "Split settings".to_string(),
        format!("  Input:           {}", config.input.display()),
        format!("  Output dir:      {}", config.output_dir.display()),
        format!("  Chunk size:      {}", config.chunk_size),
        format!("  Header rows:     {}", config.header_rows),
        format!("  Formula mode:    {formula_mode}"),
        format!("  Copy method:     {}", config.copy_method),
        format!("  No-data policy:  {}", config.no_data_policy),
    ]
    .join("\n")
}

pub fn render_summary(summary: &SplitSummary) -> String {
    let mut lines = vec![
        "Split summary".to_string(),
        format!("  Status:          {}", summary.status),
        format!("  Message:         {}", summary.message),
        format!("  Files created:   {}", summary.files_created),
        format!("  Output dir:      {}", summary.output_dir),
        format!("  Elapsed:         {} ms", summary.elapsed_ms),
    ];
    lines.extend(summary.output_files.iter().map(|file| format!("    {file}")));
    lines.join("\n")
}

pub fn render_scan(report: &ScanReport) -> String {
    let mut lines = vec![
        "Dry run".to_string(),
        format!("  Sheet:           {}", report.sheet_name),
        format!("  Rows x columns:  {} x {}", report.total_rows, report.max_col),
        format!("  Merged ranges:   {}", report.merged_ranges),
        format!("  Distinct styles: {}", report.distinct_styles),
        format!(
            "  Auto filter:     {}",
            report.auto_filter.as_deref().unwrap_or("none")
        ),
        format!("  Planned files:   {}", report.planned_files.len()),
    ];
    lines.extend(report.planned_files.iter().map(|file| format!("    {file}")));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SplitStatus;

    fn update(step: u32, total: u32) -> ProgressUpdate {
        ProgressUpdate {
            step,
            total,
            status: format!("Processing chunk {step}/{total} (rows 2-11)"),
        }
    }

    #[test]
    fn progress_line_matches_expected_layout() {
        let line = render_progress_line(&update(1, 3), 10);
        assert_eq!(
            line,
            "Progress: |███-------| 33.3% (1/3) - Processing chunk 1/3 (rows 2-11)"
        );
    }

    #[test]
    fn full_and_degenerate_bars() {
        assert!(render_progress_line(&update(3, 3), 4).contains("|████| 100.0%"));
        assert!(render_progress_line(&update(0, 0), 4).contains("|----| 0.0%"));
    }

    #[test]
    fn summary_lists_output_files() {
        let summary = SplitSummary {
            status: SplitStatus::Cancelled,
            message: "Operation cancelled.".into(),
            files_created: 1,
            output_dir: "/out".into(),
            output_files: vec!["/out/book_rows_2-11.xlsx".into()],
            started_at: "2026-01-01T00:00:00Z".into(),
            finished_at: "2026-01-01T00:00:01Z".into(),
            elapsed_ms: 1000,
        };
        let text = render_summary(&summary);
        assert!(text.contains("Status:          Cancelled"));
        assert!(text.contains("/out/book_rows_2-11.xlsx"));
    }
}
