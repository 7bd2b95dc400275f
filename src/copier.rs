//! Cell and row copying between a source sheet and a freshly created chunk.

use crate::merges::{MergedRange, sheet_merges};
use crate::model::CopyMethod;
use crate::styles::{
    StyleCache, descriptor_from_style, is_default_style, snapshot_style, stable_style_id,
};
use ahash::{AHashMap, AHashSet};
use umya_spreadsheet::{Cell, Column, Comment, Style, Worksheet};

/// How a source style becomes the style written on a target cell.
pub trait StyleStrategy: Send {
    fn name(&self) -> &'static str;

    fn materialize(&mut self, source: &Style) -> Style;

    /// Called at the start of every output chunk.
    fn reset(&mut self) {}

    /// `(hits, misses)` for strategies that cache.
    fn cache_stats(&self) -> Option<(u64, u64)> {
        None
    }
}

/// Snapshots every styled cell on its own.
#[derive(Debug, Default)]
pub struct StandardStyles;

impl StyleStrategy for StandardStyles {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn materialize(&mut self, source: &Style) -> Style {
        snapshot_style(source)
    }
}

/// Reuses styles already materialized in the current chunk.
#[derive(Debug, Default)]
pub struct CachedStyles {
    cache: StyleCache,
}

impl StyleStrategy for CachedStyles {
    fn name(&self) -> &'static str {
        "optimized"
    }

    fn materialize(&mut self, source: &Style) -> Style {
        self.cache.get_or_materialize(source, snapshot_style)
    }

    fn reset(&mut self) {
        self.cache.clear();
    }

    fn cache_stats(&self) -> Option<(u64, u64)> {
        Some((self.cache.hits(), self.cache.misses()))
    }
}

impl CopyMethod {
    pub fn strategy(self) -> Box<dyn StyleStrategy> {
        match self {
            CopyMethod::Optimized => Box::new(CachedStyles::default()),
            CopyMethod::Standard => Box::new(StandardStyles),
        }
    }
}

/// Read-only view of the sheet being split.
pub struct SourceSheet<'a> {
    sheet: &'a Worksheet,
    pub title: String,
    pub total_rows: u32,
    pub max_col: u32,
    pub merges: Vec<MergedRange>,
    pub auto_filter: Option<String>,
    comment_index: AHashMap<(u32, u32), usize>,
}

impl<'a> SourceSheet<'a> {
    pub fn new(sheet: &'a Worksheet) -> Self {
        let (max_col, total_rows) = sheet.get_highest_column_and_row();
        let auto_filter = sheet
            .get_auto_filter()
            .map(|filter| filter.get_range().get_range())
            .filter(|range| !range.is_empty());

        let comment_index = sheet
            .get_comments()
            .iter()
            .enumerate()
            .map(|(idx, comment)| {
                let coordinate = comment.get_coordinate();
                ((*coordinate.get_col_num(), *coordinate.get_row_num()), idx)
            })
            .collect();

        Self {
            sheet,
            title: sheet.get_name().to_string(),
            total_rows,
            max_col,
            merges: sheet_merges(sheet),
            auto_filter,
            comment_index,
        }
    }

    /// Number of distinct non-default cell styles, by content.
    pub fn distinct_styles(&self) -> usize {
        self.sheet
            .get_cell_collection()
            .into_iter()
            .map(Cell::get_style)
            .filter(|style| !is_default_style(style))
            .map(|style| stable_style_id(&descriptor_from_style(style)))
            .collect::<AHashSet<_>>()
            .len()
    }

    pub fn cell(&self, col: u32, row: u32) -> Option<&'a Cell> {
        self.sheet.get_cell((col, row))
    }

    /// Explicit height override for `row`, if the source sets one.
    pub fn row_height(&self, row: u32) -> Option<f64> {
        self.sheet
            .get_row_dimension(&row)
            .map(|dimension| *dimension.get_height())
            .filter(|height| *height > 0.0)
    }

    /// Width of `col` when the source sets one other than the default.
    pub fn column_width(&self, col: u32) -> Option<f64> {
        let default_width = *Column::default().get_width();
        self.sheet
            .get_column_dimension_by_number(&col)
            .map(|dimension| *dimension.get_width())
            .filter(|width| *width > 0.0 && *width != default_width)
    }

    pub fn comment_count(&self) -> usize {
        self.comment_index.len()
    }

    fn comment_at(&self, col: u32, row: u32) -> Option<&'a Comment> {
        let idx = *self.comment_index.get(&(col, row))?;
        self.sheet.get_comments().get(idx)
    }
}

/// Copies cells into one output chunk using a chosen style strategy.
pub struct CellCopier {
    styles: Box<dyn StyleStrategy>,
    preserve_formulas: bool,
}

impl CellCopier {
    pub fn new(method: CopyMethod, preserve_formulas: bool) -> Self {
        Self::with_strategy(method.strategy(), preserve_formulas)
    }

    pub fn with_strategy(styles: Box<dyn StyleStrategy>, preserve_formulas: bool) -> Self {
        Self {
            styles,
            preserve_formulas,
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.styles.name()
    }

    pub fn cache_stats(&self) -> Option<(u64, u64)> {
        self.styles.cache_stats()
    }

    /// Forgets styles materialized for the previous chunk.
    pub fn begin_chunk(&mut self) {
        self.styles.reset();
    }

    /// Copies value, style, hyperlink and comment of one cell.
    ///
    /// Missing source cells leave the target untouched.
    pub fn copy_cell(
        &mut self,
        source: &SourceSheet<'_>,
        target: &mut Worksheet,
        (col, src_row): (u32, u32),
        dst_row: u32,
    ) {
        let Some(cell) = source.cell(col, src_row) else {
            return;
        };

        let style = if is_default_style(cell.get_style()) {
            None
        } else {
            Some(self.styles.materialize(cell.get_style()))
        };

        let target_cell = target.get_cell_mut((col, dst_row));
        let mut value = cell.get_cell_value().clone();
        if !self.preserve_formulas {
            // Keeps the cached result and its stored type.
            value.remove_formula();
        }
        target_cell.set_cell_value(value);
        if let Some(style) = style {
            target_cell.set_style(style);
        }
        if let Some(hyperlink) = cell.get_hyperlink() {
            target_cell.set_hyperlink(hyperlink.clone());
        }

        if let Some(comment) = source.comment_at(col, src_row) {
            target.add_comments(relocate_comment(comment, col, src_row, dst_row));
        }
    }

    /// Copies columns `1..=max_col` of `src_row` into `dst_row`, then the row
    /// height when the source row overrides it.
    pub fn copy_row(
        &mut self,
        source: &SourceSheet<'_>,
        target: &mut Worksheet,
        src_row: u32,
        dst_row: u32,
        max_col: u32,
    ) {
        for col in 1..=max_col {
            self.copy_cell(source, target, (col, src_row), dst_row);
        }
        if let Some(height) = source.row_height(src_row) {
            let dimension = target.get_row_dimension_mut(&dst_row);
            dimension.set_height(height);
            dimension.set_custom_height(true);
        }
    }
}

/// Moves a comment from `src_row` to `dst_row`, note box included.
///
/// VML anchor rows are 0-based and may sit a few rows off the cell, so they
/// are shifted rather than recomputed.
fn relocate_comment(comment: &Comment, col: u32, src_row: u32, dst_row: u32) -> Comment {
    let mut comment = comment.clone();
    let coordinate = comment.get_coordinate_mut();
    coordinate.set_col_num(col);
    coordinate.set_row_num(dst_row);

    let shift = |row: u32| {
        let moved = i64::from(row) + i64::from(dst_row) - i64::from(src_row);
        u32::try_from(moved.max(0)).unwrap_or(u32::MAX)
    };
    let anchor = comment.get_anchor_mut();
    let (top, bottom) = (shift(*anchor.get_top_row()), shift(*anchor.get_bottom_row()));
    anchor.set_top_row(top).set_bottom_row(bottom);

    if let Some(row_target) = comment
        .get_shape_mut()
        .get_client_data_mut()
        .get_comment_row_target_mut()
    {
        row_target.set_value(dst_row.saturating_sub(1));
    }
    comment
}

/// Copies widths of columns `1..=max_col` that the source sets explicitly.
pub fn copy_column_widths(source: &SourceSheet<'_>, target: &mut Worksheet, max_col: u32) -> usize {
    let mut copied = 0;
    for col in 1..=max_col {
        if let Some(width) = source.column_width(col) {
            target.get_column_dimension_by_number_mut(&col).set_width(width);
            copied += 1;
        }
    }
    copied
}
