//! Schema discovery through index, data and schema files

mod test_data_gen;

use carbonr::bridge::memory::FileKind;
use carbonr::{DataType, Error, SchemaReader};
use test_data_gen::{fixture_schema, seeded_runtime, FIXTURE_COLUMNS, FIXTURE_PATH};

#[test]
fn test_schema_from_each_file_kind() {
    let (rt, store) = seeded_runtime(3);
    let reader = SchemaReader::new(&rt);

    let data_file = &store.file_paths(FIXTURE_PATH, FileKind::Data)[0];
    let index_file = &store.file_paths(FIXTURE_PATH, FileKind::Index)[0];
    assert!(data_file.ends_with(".carbondata"));
    assert!(index_file.ends_with(".carbonindex"));

    let expected = fixture_schema();
    assert_eq!(reader.read_schema_in_data_file(data_file).unwrap(), expected);
    assert_eq!(reader.read_schema_in_index_file(index_file).unwrap(), expected);
    assert_eq!(
        reader
            .read_schema_in_schema_file(&format!("{}/Metadata/schema", FIXTURE_PATH))
            .unwrap(),
        expected
    );
    assert_eq!(rt.live_objects(), 0);
}

#[test]
fn test_folder_path_reads_first_data_file() {
    let (rt, _) = seeded_runtime(1);
    let schema = SchemaReader::new(&rt).read_schema_in_data_file(FIXTURE_PATH).unwrap();
    assert_eq!(schema.names(), FIXTURE_COLUMNS.to_vec());
    let array = schema.field(10).unwrap();
    assert_eq!(array.data_type, DataType::Array);
    assert_eq!(array.element_type, Some(DataType::String));
}

#[test]
fn test_version_details() {
    let (rt, store) = seeded_runtime(1);
    let data_file = &store.file_paths(FIXTURE_PATH, FileKind::Data)[0];
    let details = SchemaReader::new(&rt).version_details(data_file).unwrap();
    assert!(details.ends_with("in version: 2.0.0"));
}

#[test]
fn test_wrong_file_kinds_are_managed_errors() {
    let (rt, store) = seeded_runtime(1);
    let reader = SchemaReader::new(&rt);
    let data_file = &store.file_paths(FIXTURE_PATH, FileKind::Data)[0];

    match reader.read_schema_in_index_file(data_file) {
        Err(Error::Managed { class, operation, .. }) => {
            assert!(class.ends_with("IllegalArgumentException"));
            assert!(operation.contains("readSchemaInIndexFile"));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(
        reader.read_schema_in_schema_file(FIXTURE_PATH),
        Err(Error::Managed { .. })
    ));
    assert!(matches!(
        reader.version_details("/no/such/table"),
        Err(Error::Managed { .. })
    ));
}

#[test]
fn test_discovered_schema_serializes_without_empty_element_types() {
    let (rt, _) = seeded_runtime(1);
    let schema = SchemaReader::new(&rt).read_schema_in_data_file(FIXTURE_PATH).unwrap();
    let json = serde_json::to_value(&schema).unwrap();
    let fields = json["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 12);
    assert!(fields[0].get("element_type").is_none());
    assert!(fields[10].get("element_type").is_some());
}
