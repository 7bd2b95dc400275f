// Copy method benchmarks
//
// Compares building one chunk with per-cell style snapshots against the
// per-chunk style cache, over sheets with few and many distinct styles. The
// optimized method should never be the slower one.
//
// Run with: cargo bench --bench copy_methods

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use sheet_splitter::copier::{CellCopier, SourceSheet};
use sheet_splitter::model::CopyMethod;
use umya_spreadsheet::{NumberingFormat, PatternValues, Spreadsheet};

const ROWS: u32 = 2_000;
const COLS: u32 = 12;

fn styled_book(distinct_styles: u32) -> Spreadsheet {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book.get_sheet_mut(&0).expect("sheet");
    for row in 1..=ROWS {
        for col in 1..=COLS {
            let cell = sheet.get_cell_mut((col, row));
            cell.set_value_number(f64::from(row * col));
            let style = cell.get_style_mut();
            style.get_font_mut().set_size(f64::from(8 + (row + col) % distinct_styles));
            style
                .get_number_format_mut()
                .set_format_code(NumberingFormat::FORMAT_NUMBER_00);
        }
    }
    book
}

fn copy_all(source: &SourceSheet<'_>, method: CopyMethod, rows: u32, cols: u32) -> Spreadsheet {
    let mut out = umya_spreadsheet::new_file();
    let target = out.get_sheet_mut(&0).expect("sheet");
    let mut copier = CellCopier::new(method, false);
    copier.begin_chunk();
    for row in 1..=rows {
        copier.copy_row(source, target, row, row, cols);
    }
    out
}

fn bench_copy_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("copy_rows");
    group.throughput(Throughput::Elements(u64::from(ROWS * COLS)));
    group.sample_size(20);

    for distinct in [1u32, 8, 64] {
        let book = styled_book(distinct);
        let sheet = book.get_sheet(&0).expect("sheet");
        let source = SourceSheet::new(sheet);

        for method in [CopyMethod::Standard, CopyMethod::Optimized] {
            group.bench_with_input(
                BenchmarkId::new(method.to_string(), distinct),
                &method,
                |b, &method| b.iter(|| black_box(copy_all(&source, method, ROWS, COLS))),
            );
        }
    }

    group.finish();
}

/// Every cell carries the same bold, filled, formatted style.
fn bench_shared_style(c: &mut Criterion) {
    const SHARED_ROWS: u32 = 3_000;
    const SHARED_COLS: u32 = 10;

    let mut book = umya_spreadsheet::new_file();
    let sheet = book.get_sheet_mut(&0).expect("sheet");
    for row in 1..=SHARED_ROWS {
        for col in 1..=SHARED_COLS {
            let cell = sheet.get_cell_mut((col, row));
            cell.set_value_number(f64::from(row + col));
            let style = cell.get_style_mut();
            style.get_font_mut().set_bold(true);
            style
                .get_fill_mut()
                .get_pattern_fill_mut()
                .set_pattern_type(PatternValues::Solid)
                .get_foreground_color_mut()
                .set_argb("FFDDEEFF");
            style
                .get_number_format_mut()
                .set_format_code(NumberingFormat::FORMAT_NUMBER_00);
        }
    }
    let source = SourceSheet::new(book.get_sheet(&0).expect("sheet"));

    let mut group = c.benchmark_group("shared_style");
    group.throughput(Throughput::Elements(u64::from(SHARED_ROWS * SHARED_COLS)));
    group.sample_size(20);
    for method in [CopyMethod::Standard, CopyMethod::Optimized] {
        group.bench_function(method.to_string(), |b| {
            b.iter(|| black_box(copy_all(&source, method, SHARED_ROWS, SHARED_COLS)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_copy_rows, bench_shared_style);
criterion_main!(benches);
