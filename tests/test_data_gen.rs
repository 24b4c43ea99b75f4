//! Fixture tables for the carbonr test suite

#![allow(dead_code)]

use carbonr::{DataType, Field, MemoryStore, Runtime, Schema, Value};

pub const FIXTURE_PATH: &str = "/fixtures/all_types";
pub const REMOTE_PATH: &str = "s3a://bucket/fixtures/all_types";

pub const FIXTURE_COLUMNS: [&str; 12] = [
    "stringField",
    "shortField",
    "intField",
    "longField",
    "doubleField",
    "boolField",
    "dateField",
    "timeField",
    "decimalField",
    "varcharField",
    "arrayField",
    "floatField",
];

/// The 12-column schema, one column per logical type.
pub fn fixture_schema() -> Schema {
    Schema::new(vec![
        Field::new("stringField", DataType::String),
        Field::new("shortField", DataType::Short),
        Field::new("intField", DataType::Int),
        Field::new("longField", DataType::Long),
        Field::new("doubleField", DataType::Double),
        Field::new("boolField", DataType::Boolean),
        Field::new("dateField", DataType::Date),
        Field::new("timeField", DataType::Timestamp),
        Field::new("decimalField", DataType::Decimal),
        Field::new("varcharField", DataType::Varchar),
        Field::array("arrayField", DataType::String),
        Field::new("floatField", DataType::Float),
    ])
}

pub fn fixture_row(i: usize) -> Vec<Value> {
    vec![
        Value::String(format!("robot{}", i)),
        Value::Short(i as i16),
        Value::Int(i as i32 * 10),
        Value::Long(i as i64 * 1_000_000),
        Value::Double(i as f64 + 0.5),
        Value::Boolean(i % 3 == 0),
        Value::Date(18_000 + i as i32),
        Value::Timestamp(1_560_000_000_000 + i as i64),
        Value::Decimal(format!("{}.25", i)),
        Value::Varchar(format!("v{}", i)),
        Value::Array(vec![Value::String("a".into()), Value::String(format!("b{}", i))]),
        Value::Float(i as f32 * 0.25),
    ]
}

pub fn fixture_rows(count: usize) -> Vec<Vec<Value>> {
    (0..count).map(fixture_row).collect()
}

/// Runtime over a store holding `rows` fixture rows at `FIXTURE_PATH` and
/// at `REMOTE_PATH`.
pub fn seeded_runtime(rows: usize) -> (Runtime, MemoryStore) {
    let store = MemoryStore::new();
    store.seed_table(FIXTURE_PATH, &fixture_schema(), fixture_rows(rows));
    store.seed_table(REMOTE_PATH, &fixture_schema(), fixture_rows(rows));
    (Runtime::in_memory(store.clone()), store)
}

/// Headed CSV text for the first `rows` fixture rows of `columns`.
pub fn fixture_csv(rows: usize, columns: &[usize]) -> String {
    let names: Vec<&str> = columns.iter().map(|&c| FIXTURE_COLUMNS[c]).collect();
    let mut text = names.join(",");
    text.push('\n');
    for row in fixture_rows(rows) {
        let cells: Vec<String> = columns.iter().map(|&c| row[c].to_cell()).collect();
        text.push_str(&cells.join(","));
        text.push('\n');
    }
    text
}
