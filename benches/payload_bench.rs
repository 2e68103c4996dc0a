// benches/payload_bench.rs
//! Benchmarks for decoding and payload rendering.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use notion_patch::{decode_database, ColumnConfig, ColumnSet, SchemaRegistry, ValueSet};
use serde_json::json;
use std::sync::Arc;

fn create_sample_database_json(num_properties: usize) -> String {
    let mut properties = serde_json::Map::new();
    properties.insert(
        "Name".to_string(),
        json!({"id": "title", "name": "Name", "type": "title", "title": {}}),
    );

    for i in 1..num_properties {
        let prop_name = format!("Property_{}", i);
        let prop_type = match i % 4 {
            0 => json!({
                "id": format!("prop_{}", i),
                "type": "number",
                "number": {"format": "dollar"}
            }),
            1 => json!({
                "id": format!("prop_{}", i),
                "type": "select",
                "select": {
                    "options": [
                        {"id": "opt1", "name": "Option 1", "color": "red"},
                        {"id": "opt2", "name": "Option 2", "color": "blue"}
                    ]
                }
            }),
            2 => json!({
                "id": format!("prop_{}", i),
                "type": "checkbox",
                "checkbox": {}
            }),
            _ => json!({
                "id": format!("prop_{}", i),
                "type": "rich_text",
                "rich_text": {}
            }),
        };
        properties.insert(prop_name, prop_type);
    }

    json!({
        "object": "database",
        "id": "12345678-1234-1234-1234-123456789abc",
        "title": [{"type": "text", "text": {"content": "Bench", "link": null}, "plain_text": "Bench"}],
        "properties": properties,
        "parent": {"type": "page_id", "page_id": "87654321-4321-4321-4321-cba987654321"}
    })
    .to_string()
}

fn bench_decoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_database");

    for size in [10, 100, 500] {
        let body = create_sample_database_json(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &body, |b, body| {
            b.iter(|| {
                let registry = SchemaRegistry::new();
                decode_database(black_box(body), &registry)
            });
        });
    }

    group.finish();
}

fn bench_column_set_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("column_set_build");

    for size in [10, 100, 500] {
        let registry = SchemaRegistry::new();
        let database = match decode_database(&create_sample_database_json(size), &registry) {
            Ok(database) => database,
            Err(err) => panic!("sample database failed to decode: {}", err),
        };
        let mut columns = ColumnSet::from_database(&database);
        if let Err(err) = columns.add_columns([("Extra", ColumnConfig::select(["A", "B", "C"]))]) {
            panic!("extra column rejected: {}", err);
        }

        group.bench_with_input(BenchmarkId::from_parameter(size), &columns, |b, columns| {
            b.iter(|| black_box(columns).build());
        });
    }

    group.finish();
}

fn bench_value_edits(c: &mut Criterion) {
    let registry = Arc::new(SchemaRegistry::new());
    let database = match decode_database(&create_sample_database_json(100), &registry) {
        Ok(database) => database,
        Err(err) => panic!("sample database failed to decode: {}", err),
    };

    c.bench_function("value_set_edit_and_build", |b| {
        b.iter(|| {
            let mut values = ValueSet::for_database(&database, Arc::clone(&registry));
            let _ = values.edit_values([("Property_1", "Option 2"), ("Property_3", "notes")]);
            let _ = values.edit_values([("Property_2", true)]);
            let _ = values.edit_title("Bench row");
            black_box(values.build())
        });
    });
}

criterion_group!(
    benches,
    bench_decoding,
    bench_column_set_build,
    bench_value_edits
);
criterion_main!(benches);
