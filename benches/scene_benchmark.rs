//! Benchmarks for scene building.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic operator lists and glyph runs.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pdfscene::{
    extract_pages, LineMerger, PageInput, RawGlyphRun, RawOperator, SceneOptions, TextFragment,
    VectorProcessor,
};
use serde_json::json;

/// Creates a page with `rows` outlined table rows and one text run per cell.
fn create_test_page(rows: usize) -> PageInput {
    let mut operators = Vec::new();
    let mut glyph_runs = Vec::new();

    for row in 0..rows {
        let y = 740.0 - row as f64 * 14.0;
        for col in 0..4 {
            let x = 72.0 + col as f64 * 120.0;
            let index = operators.len();
            operators.push(RawOperator::new(10, vec![], index));
            operators.push(RawOperator::new(
                58,
                vec![json!(0.2), json!(0.2), json!(0.2)],
                index + 1,
            ));
            operators.push(RawOperator::new(
                19,
                vec![json!(x), json!(y), json!(120.0), json!(14.0)],
                index + 2,
            ));
            operators.push(RawOperator::new(20, vec![], index + 3));
            operators.push(RawOperator::new(11, vec![], index + 4));

            glyph_runs.push(RawGlyphRun::new(
                [10.0, 0.0, 0.0, 10.0, x + 2.0, y + 3.0],
                format!("cell {}-{}", row, col),
                40.0,
                "Helvetica",
            ));
        }
    }

    PageInput {
        operators,
        glyph_runs,
        ..Default::default()
    }
}

/// Creates per-glyph fragments for `lines` lines of text.
fn create_fragments(lines: usize) -> Vec<TextFragment> {
    let mut fragments = Vec::new();
    for line in 0..lines {
        let baseline = 100.0 + line as f64 * 12.0;
        for (i, ch) in "The quick brown fox jumps over the lazy dog".chars().enumerate() {
            let x = 72.0 + i as f64 * 5.0;
            fragments.push(
                TextFragment::new(
                    format!("f{}_{}", line, i),
                    ch.to_string(),
                    [x, baseline - 10.0, x + 5.0, baseline],
                )
                .with_origin(x, baseline)
                .with_font("Helvetica", 10.0),
            );
        }
    }
    fragments
}

/// Benchmark the vector interpreter.
fn bench_interpreter(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpreter");

    for rows in [10, 50, 200].iter() {
        let page = create_test_page(*rows);

        group.bench_function(format!("{}_rows", rows), |b| {
            b.iter(|| {
                let mut vp = VectorProcessor::new(SceneOptions::new(792.0).interpreter);
                vp.process_all(black_box(&page.operators));
                vp.finish()
            });
        });
    }

    group.finish();
}

/// Benchmark line merging of per-glyph fragments.
fn bench_line_merging(c: &mut Criterion) {
    let fragments = create_fragments(40);
    let merger = LineMerger::default();

    c.bench_function("merge_40_lines", |b| {
        b.iter(|| merger.merge_fragments(black_box(fragments.clone())));
    });
}

/// Benchmark multi-page extraction.
fn bench_extract_pages(c: &mut Criterion) {
    let pages: Vec<PageInput> = (0..8).map(|_| create_test_page(50)).collect();
    let options = SceneOptions::new(792.0);

    c.bench_function("extract_8_pages", |b| {
        b.iter(|| extract_pages(black_box(&pages), &options));
    });
}

criterion_group!(
    benches,
    bench_interpreter,
    bench_line_merging,
    bench_extract_pages,
);
criterion_main!(benches);
