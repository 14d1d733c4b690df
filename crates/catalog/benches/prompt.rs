//! Prompt rendering benchmarks
//!
//! Measures grouping and rendering over synthetic column metadata.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use duckcat_catalog::{
    CatalogColumn, CatalogEntity, NameFilter, ObjectType, PromptFormat, PromptOptions,
    format_row_counts, render_prompt,
};

fn create_columns(tables: usize, columns: usize) -> Vec<CatalogColumn> {
    (0..tables)
        .flat_map(|t| {
            (0..columns).map(move |c| {
                let column = CatalogColumn::new(
                    "analytics",
                    format!("table_{:03}", t),
                    c as i64 + 1,
                    format!("column_{:02}", c),
                    if c % 2 == 0 { "INTEGER" } else { "VARCHAR" },
                )
                .with_row_count(1_000 * t as u64);
                if c == 0 {
                    column.with_pk(["column_00"]).with_comment("surrogate key")
                } else {
                    column.with_pk(["column_00"])
                }
            })
        })
        .collect()
}

fn bench_markdown_prompt(c: &mut Criterion) {
    let columns = create_columns(100, 20);
    let options = PromptOptions::default();

    c.bench_function("prompt/markdown_100x20", |b| {
        b.iter(|| black_box(render_prompt(black_box(&columns), &options)));
    });
}

fn bench_json_prompt(c: &mut Criterion) {
    let columns = create_columns(100, 20);
    let options = PromptOptions::default().with_format(PromptFormat::Json);

    c.bench_function("prompt/json_100x20", |b| {
        b.iter(|| black_box(render_prompt(black_box(&columns), &options)));
    });
}

fn bench_truncated_prompt(c: &mut Criterion) {
    let columns = create_columns(500, 50);
    let options = PromptOptions::default()
        .with_max_tables(10)
        .with_max_columns(5);

    c.bench_function("prompt/truncated_500x50", |b| {
        b.iter(|| black_box(render_prompt(black_box(&columns), &options)));
    });
}

fn bench_row_counts(c: &mut Criterion) {
    let entities: Vec<CatalogEntity> = (0..1_000)
        .map(|i| {
            CatalogEntity::new("analytics", format!("table_{:04}", i), ObjectType::Table)
                .with_estimated_size(i * 12_345)
        })
        .collect();
    let filter = NameFilter::only(["analytics"]);

    c.bench_function("format/row_counts_1000", |b| {
        b.iter(|| black_box(format_row_counts(black_box(&entities), &filter)));
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = bench_markdown_prompt, bench_json_prompt, bench_truncated_prompt, bench_row_counts
);

criterion_main!(benches);
