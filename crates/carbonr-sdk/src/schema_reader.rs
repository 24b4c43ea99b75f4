//! Schema discovery from index, data and schema files.

use carbonr_bridge::carbon::schema as m;
use carbonr_bridge::{Arg, Method, ObjectRef};
use carbonr_core::{DataType, Error, Field, Result, Schema};
use tracing::debug;

use crate::exception::{translate, Call};
use crate::runtime::{Pinned, Runtime};

pub struct SchemaReader<'rt> {
    rt: &'rt Runtime,
}

impl<'rt> SchemaReader<'rt> {
    pub fn new(rt: &'rt Runtime) -> Self {
        Self { rt }
    }

    /// Schema stored in a `.carbonindex` file.
    pub fn read_schema_in_index_file(&self, path: &str) -> Result<Schema> {
        self.read(&m::READ_IN_INDEX_FILE, path)
    }

    /// Schema of a `.carbondata` file, or of the first data file in a folder.
    pub fn read_schema_in_data_file(&self, path: &str) -> Result<Schema> {
        self.read(&m::READ_IN_DATA_FILE, path)
    }

    /// Schema from `<table>/Metadata/schema`.
    pub fn read_schema_in_schema_file(&self, path: &str) -> Result<Schema> {
        self.read(&m::READ_IN_SCHEMA_FILE, path)
    }

    /// Writer name and SDK version recorded in a data file footer.
    pub fn version_details(&self, path: &str) -> Result<String> {
        self.rt
            .call_static(&m::GET_VERSION_DETAILS, &[Arg::Str(path)])
            .and_then(|r| r.into_text(&m::GET_VERSION_DETAILS))
            .map_err(|e| translate(&format!("getVersionDetails({})", path), Call::Plain, e))?
            .ok_or_else(|| Error::Schema(format!("no version details in '{}'", path)))
    }

    fn read(&self, method: &Method, path: &str) -> Result<Schema> {
        let op = format!("{}({})", method.name, path);
        let obj = self
            .rt
            .call_static(method, &[Arg::Str(path)])
            .and_then(|r| r.into_object(method))
            .map_err(|e| translate(&op, Call::Plain, e))?;
        let schema = Pinned::new(self.rt, obj);
        let fields = schema
            .call(&m::GET_FIELDS, &[])
            .and_then(|r| r.into_object_array(&m::GET_FIELDS))
            .map_err(|e| translate(&op, Call::Plain, e))?;
        // pin every element first so all of them are released on error
        let fields: Vec<Pinned<'rt>> = fields.into_iter().map(|f| schema.adopt(f)).collect();
        let fields = fields
            .iter()
            .map(|f| self.field(f))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.with_context(op.clone()))?;
        debug!(path, columns = fields.len(), "schema read");
        Ok(Schema::new(fields))
    }

    fn field(&self, field: &Pinned<'rt>) -> Result<Field> {
        let name = text(field, &m::FIELD_NAME)?;
        let data_type = self.adopt(field, &m::FIELD_DATA_TYPE)?;
        let type_name = text(&data_type, &m::TYPE_NAME)?;
        let parsed: DataType = type_name.parse()?;
        if parsed != DataType::Array {
            return Ok(Field::new(name, parsed));
        }
        let element = self.adopt(&data_type, &m::ELEMENT_TYPE)?;
        let element: DataType = text(&element, &m::TYPE_NAME)?.parse()?;
        Ok(Field::array(name, element))
    }

    fn adopt(&self, on: &Pinned<'rt>, method: &Method) -> Result<Pinned<'rt>> {
        let obj: ObjectRef = on
            .call(method, &[])
            .and_then(|r| r.into_object(method))
            .map_err(|e| translate(method.name, Call::Plain, e))?;
        Ok(on.adopt(obj))
    }
}

fn text(on: &Pinned<'_>, method: &Method) -> Result<String> {
    on.call(method, &[])
        .and_then(|r| r.into_text(method))
        .map_err(|e| translate(method.name, Call::Plain, e))?
        .ok_or_else(|| Error::Schema(format!("{} returned null", method.name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use carbonr_bridge::memory::FileKind;
    use carbonr_bridge::MemoryStore;
    use carbonr_core::Value;

    fn seeded() -> (Runtime, MemoryStore, String) {
        let store = MemoryStore::new();
        let schema = Schema::new(vec![
            Field::new("name", DataType::String),
            Field::array("scores", DataType::Double),
            Field::new("price", DataType::Decimal),
        ]);
        let data = store.seed_table(
            "/data/t",
            &schema,
            vec![vec![
                Value::String("a".into()),
                Value::Array(vec![Value::Double(1.0)]),
                Value::Decimal("1.5".into()),
            ]],
        );
        (Runtime::in_memory(store.clone()), store, data)
    }

    #[test]
    fn all_three_sources_agree() {
        let (rt, store, data) = seeded();
        let reader = SchemaReader::new(&rt);
        let from_data = reader.read_schema_in_data_file(&data).unwrap();
        assert_eq!(from_data.names(), vec!["name", "scores", "price"]);
        assert_eq!(from_data.fields[1].element_type, Some(DataType::Double));

        let index = &store.file_paths("/data/t", FileKind::Index)[0];
        assert_eq!(reader.read_schema_in_index_file(index).unwrap(), from_data);
        assert_eq!(reader.read_schema_in_schema_file("/data/t/Metadata/schema").unwrap(), from_data);
        assert_eq!(reader.read_schema_in_data_file("/data/t").unwrap(), from_data);
        assert_eq!(rt.live_objects(), 0);
    }

    #[test]
    fn version_details_and_missing_files() {
        let (rt, _, data) = seeded();
        let reader = SchemaReader::new(&rt);
        assert_eq!(
            reader.version_details(&data).unwrap(),
            "carbonr fixture in version: 2.0.0"
        );
        assert!(matches!(
            reader.read_schema_in_index_file("/data/t/x.carbondata"),
            Err(Error::Managed { .. })
        ));
        assert!(matches!(
            reader.read_schema_in_data_file("/nowhere"),
            Err(Error::Managed { .. })
        ));
    }
}
