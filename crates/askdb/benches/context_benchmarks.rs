//! Prompt construction benchmarks.
//!
//! Measures schema context rendering and prompt building for schemas of
//! increasing size.

use askdb::llm::prompts::{clean_response, initial_prompt, repair_prompt};
use askdb::{Column, SchemaSnapshot, Table, render_context};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

/// Generate a schema of `tables` tables with a spread of column types and
/// foreign keys back to the previous table.
fn generate_schema(tables: usize) -> SchemaSnapshot {
    let types = ["integer", "character varying", "text", "numeric", "timestamp without time zone"];

    let tables = (0..tables)
        .map(|t| {
            let mut columns = vec![Column::new("id", "integer").primary_key()];
            for c in 0..12 {
                columns.push(Column::new(format!("field_{}", c), types[c % types.len()]));
            }
            if t > 0 {
                columns.push(
                    Column::new(format!("table_{}_id", t - 1), "integer")
                        .references(format!("table_{}", t - 1), "id"),
                );
            }
            Table::new(format!("table_{}", t), columns)
        })
        .collect();

    SchemaSnapshot::new(tables).expect("generated names are unique")
}

fn bench_render_context(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_context");

    for tables in [1, 10, 50, 200] {
        let schema = generate_schema(tables);
        group.throughput(Throughput::Elements(tables as u64));
        group.bench_with_input(BenchmarkId::from_parameter(tables), &schema, |b, schema| {
            b.iter(|| render_context(black_box(schema)))
        });
    }

    group.finish();
}

fn bench_prompts(c: &mut Criterion) {
    let context = render_context(&generate_schema(50));
    let error = "column \"field_13\" does not exist\nHINT: Perhaps you meant to reference the column \"table_3.field_1\".";

    c.bench_function("initial_prompt_50_tables", |b| {
        b.iter(|| initial_prompt(black_box("show the ten newest rows of table_3"), black_box(&context)))
    });

    c.bench_function("repair_prompt_50_tables", |b| {
        b.iter(|| {
            repair_prompt(
                black_box("show the ten newest rows of table_3"),
                black_box("SELECT field_13 FROM table_3 LIMIT 10;"),
                black_box(error),
                black_box(&context),
            )
        })
    });

    c.bench_function("clean_response_fenced", |b| {
        b.iter(|| clean_response(black_box("```sql\nSELECT * FROM table_3 ORDER BY id DESC LIMIT 10;\n```")))
    });
}

criterion_group!(benches, bench_render_context, bench_prompts);
criterion_main!(benches);
