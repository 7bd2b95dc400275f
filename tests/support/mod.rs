#![allow(dead_code)]

use std::path::{Path, PathBuf};

use sheet_splitter::model::{CopyMethod, NoDataPolicy, SplitParams};
use sheet_splitter::styles::descriptor_from_style;
use tempfile::{TempDir, tempdir};
use umya_spreadsheet::{self, Comment, Hyperlink, NumberingFormat, PatternValues, Spreadsheet};

pub fn write_workbook_to_path<F>(path: &Path, f: F)
where
    F: FnOnce(&mut Spreadsheet),
{
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create dir");
    }
    let mut book = umya_spreadsheet::new_file();
    f(&mut book);
    umya_spreadsheet::writer::xlsx::write(&book, path).expect("write workbook");
}

pub fn read_workbook(path: &Path) -> Spreadsheet {
    umya_spreadsheet::reader::xlsx::read(path).expect("read workbook")
}

/// Input and output directories that live as long as the test.
pub struct TestWorkspace {
    _tempdir: TempDir,
    root: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let tempdir = tempdir().expect("tempdir");
        let root = tempdir.path().to_path_buf();
        std::fs::create_dir_all(root.join("out")).expect("create out dir");
        Self {
            _tempdir: tempdir,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn out_dir(&self) -> PathBuf {
        self.root.join("out")
    }

    pub fn create_workbook<F>(&self, name: &str, f: F) -> PathBuf
    where
        F: FnOnce(&mut Spreadsheet),
    {
        let path = self.path(name);
        write_workbook_to_path(&path, f);
        path
    }

    pub fn params(&self, input: &Path) -> SplitParams {
        SplitParams {
            input: input.to_path_buf(),
            output_dir: self.out_dir(),
            chunk_size: 10,
            header_rows: 1,
            preserve_formulas: false,
            copy_method: CopyMethod::Optimized,
            no_data_policy: NoDataPolicy::HeaderOnly,
        }
    }

    pub fn params_with<F>(&self, input: &Path, configure: F) -> SplitParams
    where
        F: FnOnce(&mut SplitParams),
    {
        let mut params = self.params(input);
        configure(&mut params);
        params
    }

    /// File names in the output directory, sorted.
    pub fn output_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.out_dir())
            .expect("read out dir")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// A 23-row sheet named `Orders`: one styled header row and 22 data rows.
///
/// Extras exercised by the splitter:
/// - merges A1:B1 (header), A12:B13 (inside chunk 2), C11:C12 (crosses chunks 1 and 2)
/// - hyperlink on A5, comment on B14, explicit height on row 3
/// - column B width 24.0, auto filter A1:C23
/// - formula in C2
pub fn orders_workbook(book: &mut Spreadsheet) {
    let sheet = book.get_sheet_mut(&0).expect("sheet");
    sheet.set_name("Orders");

    for (col, title) in [(1, "Id"), (2, "Customer"), (3, "Total")] {
        let cell = sheet.get_cell_mut((col, 1));
        cell.set_value(title);
        let style = cell.get_style_mut();
        style.get_font_mut().set_bold(true);
        style
            .get_fill_mut()
            .get_pattern_fill_mut()
            .set_pattern_type(PatternValues::Solid)
            .get_foreground_color_mut()
            .set_argb("FFDDEEFF");
    }

    for row in 2..=23u32 {
        sheet.get_cell_mut((1, row)).set_value_number(row - 1);
        sheet
            .get_cell_mut((2, row))
            .set_value(format!("customer-{}", row - 1));
        let total = sheet.get_cell_mut((3, row));
        total.set_value_number(f64::from(row) * 1.5);
        total
            .get_style_mut()
            .get_number_format_mut()
            .set_format_code(NumberingFormat::FORMAT_NUMBER_00);
    }

    sheet.get_cell_mut((3, 2)).set_formula("A2*3");

    sheet.add_merge_cells("A1:B1");
    sheet.add_merge_cells("A12:B13");
    sheet.add_merge_cells("C11:C12");

    let mut link = Hyperlink::default();
    link.set_url("https://example.com/orders/4");
    sheet.get_cell_mut((1, 5)).set_hyperlink(link);

    let mut comment = Comment::default();
    comment.new_comment("B14");
    comment.set_author("auditor");
    comment.set_text_string("check this customer");
    sheet.add_comments(comment);

    sheet.get_row_dimension_mut(&3).set_height(32.0);
    sheet.get_column_dimension_by_number_mut(&2).set_width(24.0);
    sheet.set_auto_filter("A1:C23");
}

pub fn bold(book: &Spreadsheet, col: u32, row: u32) -> Option<bool> {
    let sheet = book.get_sheet(&0)?;
    let cell = sheet.get_cell((col, row))?;
    descriptor_from_style(cell.get_style()).font?.bold
}

pub fn merge_ranges(book: &Spreadsheet) -> Vec<String> {
    let mut ranges: Vec<String> = book
        .get_sheet(&0)
        .map(|sheet| {
            sheet
                .get_merge_cells()
                .iter()
                .map(|range| range.get_range())
                .collect()
        })
        .unwrap_or_default();
    ranges.sort();
    ranges
}
