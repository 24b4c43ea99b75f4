//! Demo tables the in-memory backend is seeded with.

use carbonr_bridge::MemoryStore;
use carbonr_core::{DataType, Field, Schema, Value};

/// Small local table read by `read-local`, `read-projection` and `schema`.
pub const DEMO_PATH: &str = "resources/carbondata";
/// Larger table for the throughput benchmarks.
pub const BENCH_PATH: &str = "resources/carbon-data-big";
/// Remote table for `read-s3`.
pub const S3_PATH: &str = "s3a://sdk/WriterOutput/carbondata";
/// Path `try-catch` builds over; never seeded.
pub const MISSING_PATH: &str = "./carbondata";

pub const DEMO_ROWS: usize = 10;

/// Every column of the demo table, in projection order.
pub const DEMO_COLUMNS: [&str; 12] = [
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

pub fn demo_schema() -> Schema {
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

/// Row `i` of the demo table.
pub fn demo_row(i: usize) -> Vec<Value> {
    let n = i as i64;
    vec![
        Value::String(format!("robot{}", i)),
        Value::Short((i % 32_768) as i16),
        Value::Int(i as i32),
        Value::Long(n * 1_000),
        Value::Double(i as f64 / 2.0),
        Value::Boolean(i % 2 == 0),
        Value::Date(17_957 + (i % 365) as i32),
        Value::Timestamp(1_551_536_523_000 + n * 1_000),
        Value::Decimal(format!("{}.{:02}", 12 + i, i % 100)),
        Value::Varchar(format!("varchar{}", i)),
        Value::Array(vec![
            Value::String("Hello".into()),
            Value::String("World".into()),
            Value::String(format!("From{}", i)),
        ]),
        Value::Float(i as f32 / 2.0),
    ]
}

pub fn demo_rows(count: usize) -> Vec<Vec<Value>> {
    (0..count).map(demo_row).collect()
}

/// Seed the demo, benchmark and remote tables.
pub fn seed_demo(store: &MemoryStore, bench_rows: usize) {
    let schema = demo_schema();
    store.seed_table(DEMO_PATH, &schema, demo_rows(DEMO_ROWS));
    store.seed_table(BENCH_PATH, &schema, demo_rows(bench_rows));
    store.seed_table(S3_PATH, &schema, demo_rows(DEMO_ROWS));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_match_the_schema() {
        let schema = demo_schema();
        assert_eq!(schema.names(), DEMO_COLUMNS.to_vec());
        for row in demo_rows(3) {
            assert_eq!(row.len(), schema.len());
            for (value, field) in row.iter().zip(&schema.fields) {
                assert_eq!(value.data_type(), Some(field.data_type));
            }
        }
    }

    #[test]
    fn seeding_leaves_the_missing_path_empty() {
        let store = MemoryStore::new();
        seed_demo(&store, 25);
        assert_eq!(store.row_count(DEMO_PATH), DEMO_ROWS);
        assert_eq!(store.row_count(BENCH_PATH), 25);
        assert!(!store.contains(MISSING_PATH));
    }
}
