//! Method handlers of the in-memory backend, keyed by signature.
//!
//! Each handler behaves like the managed method it stands in for, down to
//! the exception class it throws.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use carbonr_core::{DataType, Schema, Value};
use tracing::debug;

use super::{
    Handler, MemoryRuntime, Obj, ReaderBuilderState, ReaderState, RowState, TypeDesc,
    WriterBuilderState, WriterState,
};
use crate::call::{Arg, Method, ObjectRef, Returned};
use crate::carbon::{conf, reader, row, schema, writer};
use crate::error::{BridgeError, Result};

const ILLEGAL_ARGUMENT: &str = "java.lang.IllegalArgumentException";
const ILLEGAL_STATE: &str = "java.lang.IllegalStateException";
const FILE_NOT_FOUND: &str = "java.io.FileNotFoundException";
const ACCESS_DENIED: &str = "java.nio.file.AccessDeniedException";
const NO_SUCH_ELEMENT: &str = "java.util.NoSuchElementException";
const INDEX_OUT_OF_BOUNDS: &str = "java.lang.ArrayIndexOutOfBoundsException";
const CLASS_CAST: &str = "java.lang.ClassCastException";
const NULL_POINTER: &str = "java.lang.NullPointerException";
const NUMBER_FORMAT: &str = "java.lang.NumberFormatException";
const RUNTIME: &str = "java.lang.RuntimeException";

const DEFAULT_TABLE: &str = "_temp";
const REMOTE_SCHEMES: [&str; 3] = ["s3a://", "s3://", "obs://"];

pub(super) fn handlers() -> HashMap<Method, Handler> {
    let mut h: HashMap<Method, Handler> = HashMap::new();

    h.insert(reader::BUILDER_WITH_TABLE, reader_builder_with_table);
    h.insert(reader::BUILDER, reader_builder);
    h.insert(reader::PROJECTION, reader_projection);
    h.insert(reader::WITH_HADOOP_CONF, reader_with_hadoop_conf);
    h.insert(reader::WITH_CONFIGURATION, reader_with_configuration);
    h.insert(reader::WITH_BATCH, reader_with_batch);
    h.insert(reader::BUILD, reader_build);
    h.insert(reader::HAS_NEXT, reader_has_next);
    h.insert(reader::READ_NEXT_ROW, reader_read_next_row);
    h.insert(reader::READ_NEXT_BATCH, reader_read_next_batch);
    h.insert(reader::CLOSE, reader_close);

    h.insert(row::GET_LENGTH, row_get_length);
    h.insert(row::GET_DATA_TYPE_NAME, row_get_data_type_name);
    h.insert(row::GET_ARRAY_ELEMENT_TYPE_NAME, row_get_array_element_type_name);
    h.insert(row::GET_SHORT, row_get_short);
    h.insert(row::GET_INT, row_get_int);
    h.insert(row::GET_LONG, row_get_long);
    h.insert(row::GET_DOUBLE, row_get_double);
    h.insert(row::GET_FLOAT, row_get_float);
    h.insert(row::GET_BOOLEAN, row_get_boolean);
    h.insert(row::GET_STRING, row_get_string);
    h.insert(row::GET_VARCHAR, row_get_string);
    h.insert(row::GET_DECIMAL, row_get_decimal);
    h.insert(row::GET_ARRAY, row_get_array);

    h.insert(writer::BUILDER, writer_builder);
    h.insert(writer::OUTPUT_PATH, writer_output_path);
    h.insert(writer::WITH_CSV_INPUT, writer_with_csv_input);
    h.insert(writer::WITH_HADOOP_CONF, writer_with_hadoop_conf);
    h.insert(writer::WRITTEN_BY, writer_written_by);
    h.insert(writer::SORT_BY, writer_sort_by);
    h.insert(writer::WITH_BLOCK_SIZE, writer_with_block_size);
    h.insert(writer::WITH_BLOCKLET_SIZE, writer_with_blocklet_size);
    h.insert(writer::UNIQUE_IDENTIFIER, writer_unique_identifier);
    h.insert(writer::BUILD, writer_build);
    h.insert(writer::WRITE, writer_write);
    h.insert(writer::CLOSE, writer_close);

    h.insert(schema::READ_IN_INDEX_FILE, schema_read_in_index_file);
    h.insert(schema::READ_IN_DATA_FILE, schema_read_in_data_file);
    h.insert(schema::READ_IN_SCHEMA_FILE, schema_read_in_schema_file);
    h.insert(schema::GET_VERSION_DETAILS, schema_get_version_details);
    h.insert(schema::GET_FIELDS, schema_get_fields);
    h.insert(schema::FIELD_NAME, field_name);
    h.insert(schema::FIELD_DATA_TYPE, field_data_type);
    h.insert(schema::TYPE_NAME, type_name);
    h.insert(schema::ELEMENT_TYPE, type_element);

    h.insert(conf::NEW, conf_new);
    h.insert(conf::SET, conf_set);
    h.insert(conf::GET, conf_get);

    h
}

fn throw(class: &str, message: impl Into<String>) -> BridgeError {
    BridgeError::exception(class, message)
}

fn bad_args(method: &'static str, message: impl Into<String>) -> BridgeError {
    BridgeError::BadArguments {
        method,
        message: message.into(),
    }
}

fn this(target: Option<ObjectRef>, method: &'static str) -> Result<ObjectRef> {
    target.ok_or_else(|| bad_args(method, "instance method without a target"))
}

fn arg_str<'a>(args: &[Arg<'a>], i: usize, method: &'static str) -> Result<&'a str> {
    match args.get(i) {
        Some(Arg::Str(s)) => Ok(*s),
        other => Err(bad_args(method, format!("argument {} must be String, got {:?}", i, other))),
    }
}

fn arg_strs<'a>(args: &[Arg<'a>], i: usize, method: &'static str) -> Result<&'a [String]> {
    match args.get(i) {
        Some(Arg::StrArray(items)) => Ok(*items),
        other => Err(bad_args(method, format!("argument {} must be String[], got {:?}", i, other))),
    }
}

fn arg_int(args: &[Arg<'_>], i: usize, method: &'static str) -> Result<i32> {
    match args.get(i) {
        Some(Arg::Int(v)) => Ok(*v),
        other => Err(bad_args(method, format!("argument {} must be int, got {:?}", i, other))),
    }
}

fn arg_long(args: &[Arg<'_>], i: usize, method: &'static str) -> Result<i64> {
    match args.get(i) {
        Some(Arg::Long(v)) => Ok(*v),
        other => Err(bad_args(method, format!("argument {} must be long, got {:?}", i, other))),
    }
}

fn arg_obj(args: &[Arg<'_>], i: usize, method: &'static str) -> Result<ObjectRef> {
    match args.get(i) {
        Some(Arg::Object(o)) => Ok(*o),
        other => Err(bad_args(method, format!("argument {} must be an object, got {:?}", i, other))),
    }
}

/// Borrow the target as one `Obj` variant, or fail like a bad JNI cast would.
macro_rules! target_as {
    ($rt:expr, $target:expr, $variant:ident, $method:expr) => {{
        let target = this($target, $method)?;
        match $rt.get_mut(target)? {
            Obj::$variant(inner) => inner,
            other => {
                return Err(bad_args(
                    $method,
                    format!("target is a {}, expected {}", other.kind(), stringify!($variant)),
                ))
            }
        }
    }};
}

fn same(target: Option<ObjectRef>) -> Result<Returned> {
    Ok(Returned::Object(target))
}

fn is_remote(path: &str) -> bool {
    REMOTE_SCHEMES.iter().any(|s| path.starts_with(s))
}

// ---------------------------------------------------------------------------
// CarbonReaderBuilder / CarbonReader
// ---------------------------------------------------------------------------

fn new_reader_builder(rt: &mut MemoryRuntime, path: &str, table: &str) -> Returned {
    let obj = rt.pin(Obj::ReaderBuilder(ReaderBuilderState {
        path: path.to_string(),
        table: table.to_string(),
        projection: None,
        conf: Default::default(),
        batch: None,
    }));
    Returned::Object(Some(obj))
}

fn reader_builder_with_table(rt: &mut MemoryRuntime, _: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    let path = arg_str(args, 0, "builder")?;
    let table = arg_str(args, 1, "builder")?;
    Ok(new_reader_builder(rt, path, table))
}

fn reader_builder(rt: &mut MemoryRuntime, _: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    let path = arg_str(args, 0, "builder")?;
    Ok(new_reader_builder(rt, path, DEFAULT_TABLE))
}

fn reader_projection(rt: &mut MemoryRuntime, target: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    let columns = arg_strs(args, 0, "projection")?;
    let b = target_as!(rt, target, ReaderBuilder, "projection");
    b.projection = Some(columns.to_vec());
    same(target)
}

fn reader_with_hadoop_conf(rt: &mut MemoryRuntime, target: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    let key = arg_str(args, 0, "withHadoopConf")?;
    let value = arg_str(args, 1, "withHadoopConf")?;
    let b = target_as!(rt, target, ReaderBuilder, "withHadoopConf");
    b.conf.set(key, value);
    same(target)
}

fn reader_with_configuration(rt: &mut MemoryRuntime, target: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    let conf = arg_obj(args, 0, "withHadoopConf")?;
    let entries = match rt.get(conf)? {
        Obj::Configuration(map) => map.clone(),
        other => {
            return Err(throw(
                CLASS_CAST,
                format!("{} cannot be cast to org.apache.hadoop.conf.Configuration", other.kind()),
            ))
        }
    };
    let b = target_as!(rt, target, ReaderBuilder, "withHadoopConf");
    for (k, v) in entries {
        b.conf.set(k, v);
    }
    same(target)
}

fn reader_with_batch(rt: &mut MemoryRuntime, target: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    let size = arg_int(args, 0, "withBatch")?;
    if size <= 0 {
        return Err(throw(ILLEGAL_ARGUMENT, format!("batch size should be positive, got {}", size)));
    }
    let b = target_as!(rt, target, ReaderBuilder, "withBatch");
    b.batch = Some(size);
    same(target)
}

fn reader_build(rt: &mut MemoryRuntime, target: Option<ObjectRef>, _: &[Arg<'_>]) -> Result<Returned> {
    let b = target_as!(rt, target, ReaderBuilder, "build").clone();
    for (k, v) in b.conf.iter() {
        rt.store.record_config(&b.path, k, v);
    }
    if is_remote(&b.path) && !b.conf.iter().any(|(k, _)| k.ends_with("access.key")) {
        return Err(throw(
            ACCESS_DENIED,
            format!("{}: no credentials, set fs.s3a.access.key and fs.s3a.secret.key", b.path),
        ));
    }
    let (schema, rows) = rt
        .store
        .table(&b.path)
        .ok_or_else(|| throw(FILE_NOT_FOUND, format!("{} (no carbondata files found)", b.path)))?;
    let (schema, rows) = match &b.projection {
        Some(columns) => project(&schema, rows, columns)?,
        None => (schema, rows),
    };
    debug!(
        path = %b.path,
        table = %b.table,
        rows = rows.len(),
        batch = ?b.batch,
        "memory reader built"
    );
    let reader = rt.pin(Obj::Reader(ReaderState {
        schema: Rc::new(schema),
        rows,
        cursor: 0,
        closed: false,
    }));
    Ok(Returned::Object(Some(reader)))
}

fn project(schema: &Schema, rows: Vec<Vec<Value>>, columns: &[String]) -> Result<(Schema, Vec<Vec<Value>>)> {
    let projected = schema.project(columns).map_err(|e| match e {
        carbonr_core::Error::Schema(msg) => throw(ILLEGAL_ARGUMENT, format!("Projection {}", msg)),
        other => throw(ILLEGAL_ARGUMENT, other.to_string()),
    })?;
    let idx: Vec<usize> = columns.iter().filter_map(|c| schema.index_of(c)).collect();
    let rows = rows
        .into_iter()
        .map(|r| idx.iter().map(|&i| r[i].clone()).collect())
        .collect();
    Ok((projected, rows))
}

fn open_reader<'r>(rt: &'r mut MemoryRuntime, target: Option<ObjectRef>, method: &'static str) -> Result<&'r mut ReaderState> {
    let r = target_as!(rt, target, Reader, method);
    if r.closed {
        return Err(throw(ILLEGAL_STATE, "CarbonReader is closed"));
    }
    Ok(r)
}

fn reader_has_next(rt: &mut MemoryRuntime, target: Option<ObjectRef>, _: &[Arg<'_>]) -> Result<Returned> {
    let r = open_reader(rt, target, "hasNext")?;
    Ok(Returned::Boolean(r.cursor < r.rows.len()))
}

fn reader_read_next_row(rt: &mut MemoryRuntime, target: Option<ObjectRef>, _: &[Arg<'_>]) -> Result<Returned> {
    let r = open_reader(rt, target, "readNextCarbonRow")?;
    let values = r
        .rows
        .get(r.cursor)
        .cloned()
        .ok_or_else(|| throw(NO_SUCH_ELEMENT, "no more rows"))?;
    r.cursor += 1;
    let schema = Rc::clone(&r.schema);
    let row = rt.pin(Obj::Row(RowState { schema, values }));
    Ok(Returned::Object(Some(row)))
}

fn reader_read_next_batch(rt: &mut MemoryRuntime, target: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    let size = arg_int(args, 0, "readNextBatchRow")?;
    if size <= 0 {
        return Err(throw(ILLEGAL_ARGUMENT, format!("batch size should be positive, got {}", size)));
    }
    let r = open_reader(rt, target, "readNextBatchRow")?;
    let remaining = r.rows.len() - r.cursor;
    if remaining == 0 {
        return Err(throw(NO_SUCH_ELEMENT, "no more rows"));
    }
    let take = remaining.min(size as usize);
    let batch: Vec<Vec<Value>> = r.rows[r.cursor..r.cursor + take].to_vec();
    r.cursor += take;
    let schema = Rc::clone(&r.schema);
    let rows = batch
        .into_iter()
        .map(|values| {
            rt.pin(Obj::Row(RowState {
                schema: Rc::clone(&schema),
                values,
            }))
        })
        .collect();
    Ok(Returned::ObjectArray(rows))
}

fn reader_close(rt: &mut MemoryRuntime, target: Option<ObjectRef>, _: &[Arg<'_>]) -> Result<Returned> {
    let r = target_as!(rt, target, Reader, "close");
    r.closed = true;
    r.rows.clear();
    Ok(Returned::Void)
}

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// Boxed Java class of a stored value, for cast failures.
fn java_class(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Short(_) => "java.lang.Short",
        Value::Int(_) | Value::Date(_) => "java.lang.Integer",
        Value::Long(_) | Value::Timestamp(_) => "java.lang.Long",
        Value::Float(_) => "java.lang.Float",
        Value::Double(_) => "java.lang.Double",
        Value::Boolean(_) => "java.lang.Boolean",
        Value::String(_) | Value::Varchar(_) => "java.lang.String",
        Value::Decimal(_) => "java.math.BigDecimal",
        Value::Array(_) => "[Ljava.lang.Object;",
    }
}

fn cast_error(v: &Value, to: &str) -> BridgeError {
    throw(CLASS_CAST, format!("{} cannot be cast to {}", java_class(v), to))
}

fn null_error(method: &str, ordinal: usize) -> BridgeError {
    throw(NULL_POINTER, format!("{}({}) on a null value", method, ordinal))
}

/// Field at `ordinal` of the target row: column type, array element type, value.
fn cell(
    rt: &MemoryRuntime,
    target: Option<ObjectRef>,
    args: &[Arg<'_>],
    method: &'static str,
) -> Result<(usize, DataType, Option<DataType>, Value)> {
    let ordinal = arg_int(args, 0, method)?;
    let row = match rt.get(this(target, method)?)? {
        Obj::Row(r) => r,
        other => return Err(bad_args(method, format!("target is a {}, expected Row", other.kind()))),
    };
    let len = row.values.len();
    let idx = usize::try_from(ordinal)
        .ok()
        .filter(|&i| i < len)
        .ok_or_else(|| throw(INDEX_OUT_OF_BOUNDS, format!("Index {} out of bounds for length {}", ordinal, len)))?;
    let (data_type, element) = row
        .schema
        .field(idx)
        .map(|f| (f.data_type, f.element_type))
        .unwrap_or((DataType::String, None));
    Ok((idx, data_type, element, row.values[idx].clone()))
}

fn row_get_length(rt: &mut MemoryRuntime, target: Option<ObjectRef>, _: &[Arg<'_>]) -> Result<Returned> {
    let r = target_as!(rt, target, Row, "getLength");
    Ok(Returned::Int(r.values.len() as i32))
}

fn row_get_data_type_name(rt: &mut MemoryRuntime, target: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    let (_, data_type, _, _) = cell(rt, target, args, "getDataTypeName")?;
    Ok(Returned::Text(Some(data_type.name().to_string())))
}

fn row_get_array_element_type_name(
    rt: &mut MemoryRuntime,
    target: Option<ObjectRef>,
    args: &[Arg<'_>],
) -> Result<Returned> {
    match cell(rt, target, args, "getArrayElementTypeName")? {
        (_, DataType::Array, element, _) => Ok(Returned::Text(Some(
            element.unwrap_or(DataType::String).name().to_string(),
        ))),
        _ => Err(throw(RUNTIME, "Only support Array type.")),
    }
}

fn row_get_short(rt: &mut MemoryRuntime, target: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    match cell(rt, target, args, "getShort")? {
        (_, _, _, Value::Short(v)) => Ok(Returned::Short(v)),
        (i, _, _, Value::Null) => Err(null_error("getShort", i)),
        (_, _, _, other) => Err(cast_error(&other, "java.lang.Short")),
    }
}

fn row_get_int(rt: &mut MemoryRuntime, target: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    match cell(rt, target, args, "getInt")? {
        (_, _, _, Value::Int(v)) | (_, _, _, Value::Date(v)) => Ok(Returned::Int(v)),
        (i, _, _, Value::Null) => Err(null_error("getInt", i)),
        (_, _, _, other) => Err(cast_error(&other, "java.lang.Integer")),
    }
}

fn row_get_long(rt: &mut MemoryRuntime, target: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    match cell(rt, target, args, "getLong")? {
        (_, _, _, Value::Long(v)) | (_, _, _, Value::Timestamp(v)) => Ok(Returned::Long(v)),
        (i, _, _, Value::Null) => Err(null_error("getLong", i)),
        (_, _, _, other) => Err(cast_error(&other, "java.lang.Long")),
    }
}

fn row_get_double(rt: &mut MemoryRuntime, target: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    match cell(rt, target, args, "getDouble")? {
        (_, _, _, Value::Double(v)) => Ok(Returned::Double(v)),
        (i, _, _, Value::Null) => Err(null_error("getDouble", i)),
        (_, _, _, other) => Err(cast_error(&other, "java.lang.Double")),
    }
}

fn row_get_float(rt: &mut MemoryRuntime, target: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    match cell(rt, target, args, "getFloat")? {
        (_, _, _, Value::Float(v)) => Ok(Returned::Float(v)),
        (i, _, _, Value::Null) => Err(null_error("getFloat", i)),
        (_, _, _, other) => Err(cast_error(&other, "java.lang.Float")),
    }
}

fn row_get_boolean(rt: &mut MemoryRuntime, target: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    match cell(rt, target, args, "getBoolean")? {
        (_, _, _, Value::Boolean(v)) => Ok(Returned::Boolean(v)),
        (i, _, _, Value::Null) => Err(null_error("getBoolean", i)),
        (_, _, _, other) => Err(cast_error(&other, "java.lang.Boolean")),
    }
}

/// `getString` and `getVarchar`: a plain cast, so null stays null.
fn row_get_string(rt: &mut MemoryRuntime, target: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    match cell(rt, target, args, "getString")? {
        (_, _, _, Value::String(s)) | (_, _, _, Value::Varchar(s)) => Ok(Returned::Text(Some(s))),
        (_, _, _, Value::Null) => Ok(Returned::Text(None)),
        (_, _, _, other) => Err(cast_error(&other, "java.lang.String")),
    }
}

fn row_get_decimal(rt: &mut MemoryRuntime, target: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    match cell(rt, target, args, "getDecimal")? {
        (_, _, _, Value::Decimal(s)) => Ok(Returned::Text(Some(s))),
        (i, _, _, Value::Null) => Err(null_error("getDecimal", i)),
        (_, _, _, other) => Err(cast_error(&other, "java.math.BigDecimal")),
    }
}

fn row_get_array(rt: &mut MemoryRuntime, target: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    match cell(rt, target, args, "getArray")? {
        (_, _, _, Value::Array(items)) => Ok(Returned::TextArray(
            items
                .iter()
                .map(|v| if v.is_null() { None } else { Some(v.to_cell()) })
                .collect(),
        )),
        (i, _, _, Value::Null) => Err(null_error("getArray", i)),
        (_, _, _, other) => Err(cast_error(&other, "[Ljava.lang.Object;")),
    }
}

// ---------------------------------------------------------------------------
// CarbonWriterBuilder / CarbonWriter
// ---------------------------------------------------------------------------

fn writer_builder(rt: &mut MemoryRuntime, _: Option<ObjectRef>, _: &[Arg<'_>]) -> Result<Returned> {
    let obj = rt.pin(Obj::WriterBuilder(WriterBuilderState::default()));
    Ok(Returned::Object(Some(obj)))
}

fn writer_output_path(rt: &mut MemoryRuntime, target: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    let path = arg_str(args, 0, "outputPath")?;
    let b = target_as!(rt, target, WriterBuilder, "outputPath");
    b.path = Some(path.to_string());
    same(target)
}

fn writer_with_csv_input(rt: &mut MemoryRuntime, target: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    let json = arg_str(args, 0, "withCsvInput")?;
    let parsed = Schema::parse_json_schema(json).map_err(|e| throw(ILLEGAL_ARGUMENT, e.to_string()))?;
    let b = target_as!(rt, target, WriterBuilder, "withCsvInput");
    b.schema = Some(parsed);
    same(target)
}

fn writer_with_hadoop_conf(rt: &mut MemoryRuntime, target: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    let key = arg_str(args, 0, "withHadoopConf")?;
    let value = arg_str(args, 1, "withHadoopConf")?;
    let b = target_as!(rt, target, WriterBuilder, "withHadoopConf");
    b.conf.set(key, value);
    same(target)
}

fn writer_written_by(rt: &mut MemoryRuntime, target: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    let name = arg_str(args, 0, "writtenBy")?;
    let b = target_as!(rt, target, WriterBuilder, "writtenBy");
    b.written_by = Some(name.to_string());
    same(target)
}

fn writer_sort_by(rt: &mut MemoryRuntime, target: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    let columns = arg_strs(args, 0, "sortBy")?;
    let b = target_as!(rt, target, WriterBuilder, "sortBy");
    b.sort_by = columns.to_vec();
    same(target)
}

fn writer_with_block_size(rt: &mut MemoryRuntime, target: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    let mb = arg_int(args, 0, "withBlockSize")?;
    if !(1..=2048).contains(&mb) {
        return Err(throw(ILLEGAL_ARGUMENT, "Block size should be between 1 MB to 2048 MB"));
    }
    let b = target_as!(rt, target, WriterBuilder, "withBlockSize");
    b.block_size_mb = Some(mb);
    same(target)
}

fn writer_with_blocklet_size(rt: &mut MemoryRuntime, target: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    let mb = arg_int(args, 0, "withBlockletSize")?;
    if mb <= 0 {
        return Err(throw(ILLEGAL_ARGUMENT, "blocklet size should be greater than zero"));
    }
    let b = target_as!(rt, target, WriterBuilder, "withBlockletSize");
    b.blocklet_size_mb = Some(mb);
    same(target)
}

fn writer_unique_identifier(rt: &mut MemoryRuntime, target: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    let id = arg_long(args, 0, "uniqueIdentifier")?;
    let b = target_as!(rt, target, WriterBuilder, "uniqueIdentifier");
    b.unique_id = Some(id);
    same(target)
}

fn writer_build(rt: &mut MemoryRuntime, target: Option<ObjectRef>, _: &[Arg<'_>]) -> Result<Returned> {
    let b = target_as!(rt, target, WriterBuilder, "build").clone();
    let path = b
        .path
        .ok_or_else(|| throw(ILLEGAL_ARGUMENT, "output path should not be null"))?;
    let schema = b
        .schema
        .ok_or_else(|| throw(ILLEGAL_ARGUMENT, "schema should be set, call withCsvInput first"))?;
    let written_by = b
        .written_by
        .filter(|w| !w.trim().is_empty())
        .ok_or_else(|| throw(ILLEGAL_ARGUMENT, "Writer done by must be set, call writtenBy first"))?;
    let sort_by = b
        .sort_by
        .iter()
        .map(|c| {
            schema.index_of(c).ok_or_else(|| {
                throw(ILLEGAL_ARGUMENT, format!("column: {} specified in sort columns does not exist", c))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    for (k, v) in b.conf.iter() {
        rt.store.record_config(&path, k, v);
    }
    debug!(
        path = %path,
        columns = schema.len(),
        block_size_mb = ?b.block_size_mb,
        blocklet_size_mb = ?b.blocklet_size_mb,
        unique_id = ?b.unique_id,
        "memory writer built"
    );
    let writer = rt.pin(Obj::Writer(WriterState {
        path,
        schema,
        rows: Vec::new(),
        written_by,
        sort_by,
        closed: false,
    }));
    Ok(Returned::Object(Some(writer)))
}

fn writer_write(rt: &mut MemoryRuntime, target: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    let record = arg_strs(args, 0, "write")?;
    let w = target_as!(rt, target, Writer, "write");
    if w.closed {
        return Err(throw(ILLEGAL_STATE, "CarbonWriter is closed"));
    }
    if record.len() != w.schema.len() {
        return Err(throw(
            ILLEGAL_ARGUMENT,
            format!("record has {} fields, schema has {}", record.len(), w.schema.len()),
        ));
    }
    let row = record
        .iter()
        .zip(&w.schema.fields)
        .map(|(cell, field)| {
            Value::parse(cell, field.data_type, field.element_type).map_err(|e| {
                let class = match field.data_type {
                    DataType::Short
                    | DataType::Int
                    | DataType::Long
                    | DataType::Float
                    | DataType::Double
                    | DataType::Decimal => NUMBER_FORMAT,
                    _ => ILLEGAL_ARGUMENT,
                };
                throw(class, format!("column {}: {}", field.name, e))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    w.rows.push(row);
    Ok(Returned::Void)
}

fn writer_close(rt: &mut MemoryRuntime, target: Option<ObjectRef>, _: &[Arg<'_>]) -> Result<Returned> {
    let w = target_as!(rt, target, Writer, "close");
    if w.closed {
        return Ok(Returned::Void);
    }
    w.closed = true;
    let mut rows = std::mem::take(&mut w.rows);
    if rows.is_empty() {
        return Ok(Returned::Void);
    }
    let keys = w.sort_by.clone();
    if !keys.is_empty() {
        rows.sort_by(|a, b| {
            keys.iter()
                .map(|&k| compare(&a[k], &b[k]))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
    }
    let (path, schema, written_by) = (w.path.clone(), w.schema.clone(), w.written_by.clone());
    let n = rows.len();
    let file = rt.store.commit(&path, schema, rows, &written_by);
    debug!(file = %file, rows = n, "memory writer committed");
    Ok(Returned::Void)
}

/// Ordering used by `sortBy`; nulls first.
fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Short(x), Value::Short(y)) => x.cmp(y),
        (Value::Int(x), Value::Int(y)) | (Value::Date(x), Value::Date(y)) => x.cmp(y),
        (Value::Long(x), Value::Long(y)) | (Value::Timestamp(x), Value::Timestamp(y)) => x.cmp(y),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Value::Double(x), Value::Double(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
        (Value::Decimal(x), Value::Decimal(y)) => match (x.parse::<f64>(), y.parse::<f64>()) {
            (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => x.cmp(y),
        },
        _ => a.to_cell().cmp(&b.to_cell()),
    }
}

// ---------------------------------------------------------------------------
// CarbonSchemaReader / Schema / Field / DataType
// ---------------------------------------------------------------------------

fn pin_schema(rt: &mut MemoryRuntime, schema: Schema) -> Returned {
    Returned::Object(Some(rt.pin(Obj::Schema(schema))))
}

fn schema_read_in_index_file(rt: &mut MemoryRuntime, _: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    let path = arg_str(args, 0, "readSchemaInIndexFile")?;
    if !path.ends_with(".carbonindex") {
        return Err(throw(ILLEGAL_ARGUMENT, format!("{} is not a carbonindex file", path)));
    }
    let file = rt
        .store
        .file(path)
        .ok_or_else(|| throw(FILE_NOT_FOUND, path.to_string()))?;
    Ok(pin_schema(rt, file.schema))
}

/// A `.carbondata` path, or a folder standing for its first data file.
fn data_file(rt: &MemoryRuntime, path: &str) -> Result<super::StoredFile> {
    let found = if path.ends_with(".carbondata") {
        rt.store.file(path)
    } else {
        rt.store.first_data_file(path)
    };
    found.ok_or_else(|| throw(FILE_NOT_FOUND, format!("{} (no carbondata file)", path)))
}

fn schema_read_in_data_file(rt: &mut MemoryRuntime, _: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    let path = arg_str(args, 0, "readSchemaInDataFile")?;
    let file = data_file(rt, path)?;
    Ok(pin_schema(rt, file.schema))
}

fn schema_read_in_schema_file(rt: &mut MemoryRuntime, _: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    let path = arg_str(args, 0, "readSchemaInSchemaFile")?;
    let folder = path
        .strip_suffix("/Metadata/schema")
        .ok_or_else(|| throw(FILE_NOT_FOUND, path.to_string()))?;
    let file = rt
        .store
        .first_data_file(folder)
        .ok_or_else(|| throw(FILE_NOT_FOUND, path.to_string()))?;
    Ok(pin_schema(rt, file.schema))
}

fn schema_get_version_details(rt: &mut MemoryRuntime, _: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    let path = arg_str(args, 0, "getVersionDetails")?;
    let file = data_file(rt, path)?;
    Ok(Returned::Text(Some(format!(
        "{} in version: {}",
        file.written_by, file.version
    ))))
}

fn schema_get_fields(rt: &mut MemoryRuntime, target: Option<ObjectRef>, _: &[Arg<'_>]) -> Result<Returned> {
    let fields = target_as!(rt, target, Schema, "getFields").fields.clone();
    let refs = fields.into_iter().map(|f| rt.pin(Obj::Field(f))).collect();
    Ok(Returned::ObjectArray(refs))
}

fn field_name(rt: &mut MemoryRuntime, target: Option<ObjectRef>, _: &[Arg<'_>]) -> Result<Returned> {
    let f = target_as!(rt, target, Field, "getFieldName");
    Ok(Returned::Text(Some(f.name.clone())))
}

fn field_data_type(rt: &mut MemoryRuntime, target: Option<ObjectRef>, _: &[Arg<'_>]) -> Result<Returned> {
    let f = target_as!(rt, target, Field, "getDataType");
    let desc = TypeDesc {
        data_type: f.data_type,
        element: f.element_type,
    };
    Ok(Returned::Object(Some(rt.pin(Obj::Type(desc)))))
}

fn type_name(rt: &mut MemoryRuntime, target: Option<ObjectRef>, _: &[Arg<'_>]) -> Result<Returned> {
    let t = target_as!(rt, target, Type, "getName");
    Ok(Returned::Text(Some(t.data_type.name().to_string())))
}

fn type_element(rt: &mut MemoryRuntime, target: Option<ObjectRef>, _: &[Arg<'_>]) -> Result<Returned> {
    let t = *target_as!(rt, target, Type, "getElementType");
    if t.data_type != DataType::Array {
        return Err(throw(
            CLASS_CAST,
            format!("{} cannot be cast to ArrayType", t.data_type.name()),
        ));
    }
    let desc = TypeDesc {
        data_type: t.element.unwrap_or(DataType::String),
        element: None,
    };
    Ok(Returned::Object(Some(rt.pin(Obj::Type(desc)))))
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

fn conf_new(rt: &mut MemoryRuntime, _: Option<ObjectRef>, _: &[Arg<'_>]) -> Result<Returned> {
    Ok(Returned::Object(Some(rt.pin(Obj::Configuration(BTreeMap::new())))))
}

fn conf_set(rt: &mut MemoryRuntime, target: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    let key = arg_str(args, 0, "set")?;
    let value = arg_str(args, 1, "set")?;
    let map = target_as!(rt, target, Configuration, "set");
    map.insert(key.to_string(), value.to_string());
    Ok(Returned::Void)
}

fn conf_get(rt: &mut MemoryRuntime, target: Option<ObjectRef>, args: &[Arg<'_>]) -> Result<Returned> {
    let key = arg_str(args, 0, "get")?;
    let map = target_as!(rt, target, Configuration, "get");
    Ok(Returned::Text(map.get(key).cloned()))
}

#[cfg(test)]
mod tests {
    use carbonr_core::{Field, Schema, Value};

    use crate::call::{Arg, ObjectRef};
    use crate::carbon::{reader, row, writer};
    use crate::memory::{MemoryRuntime, MemoryStore};
    use crate::runtime::ManagedRuntime;

    fn seeded() -> (MemoryRuntime, MemoryStore) {
        let store = MemoryStore::new();
        let schema = Schema::new(vec![
            Field::new("name", carbonr_core::DataType::String),
            Field::new("age", carbonr_core::DataType::Int),
        ]);
        store.seed_table(
            "/data/people",
            &schema,
            vec![
                vec![Value::String("ann".into()), Value::Int(31)],
                vec![Value::String("bob".into()), Value::Null],
            ],
        );
        (MemoryRuntime::with_store(store.clone()), store)
    }

    fn open(rt: &mut MemoryRuntime, path: &str) -> ObjectRef {
        let b = rt
            .call_static(&reader::BUILDER, &[Arg::Str(path)])
            .unwrap()
            .into_object(&reader::BUILDER)
            .unwrap();
        rt.call_method(b, &reader::BUILD, &[])
            .unwrap()
            .into_object(&reader::BUILD)
            .unwrap()
    }

    #[test]
    fn reads_rows_then_throws_no_such_element() {
        let (mut rt, _) = seeded();
        let r = open(&mut rt, "/data/people");
        let mut names = Vec::new();
        while rt.call_method(r, &reader::HAS_NEXT, &[]).unwrap().into_bool(&reader::HAS_NEXT).unwrap() {
            let row = rt
                .call_method(r, &reader::READ_NEXT_ROW, &[])
                .unwrap()
                .into_object(&reader::READ_NEXT_ROW)
                .unwrap();
            let name = rt
                .call_method(row, &row::GET_STRING, &[Arg::Int(0)])
                .unwrap()
                .into_text(&row::GET_STRING)
                .unwrap();
            names.push(name.unwrap());
        }
        assert_eq!(names, vec!["ann", "bob"]);
        let err = rt.call_method(r, &reader::READ_NEXT_ROW, &[]).unwrap_err();
        assert!(err.is_exception("NoSuchElementException"));
    }

    #[test]
    fn row_getters_throw_like_java() {
        let (mut rt, _) = seeded();
        let r = open(&mut rt, "/data/people");
        let batch = rt
            .call_method(r, &reader::READ_NEXT_BATCH, &[Arg::Int(10)])
            .unwrap()
            .into_object_array(&reader::READ_NEXT_BATCH)
            .unwrap();
        assert_eq!(batch.len(), 2);

        let cast = rt.call_method(batch[0], &row::GET_INT, &[Arg::Int(0)]).unwrap_err();
        assert!(cast.is_exception("ClassCastException"));
        let oob = rt.call_method(batch[0], &row::GET_INT, &[Arg::Int(2)]).unwrap_err();
        assert!(oob.is_exception("IndexOutOfBoundsException"));
        let npe = rt.call_method(batch[1], &row::GET_INT, &[Arg::Int(1)]).unwrap_err();
        assert!(npe.is_exception("NullPointerException"));
        let elem = rt
            .call_method(batch[0], &row::GET_ARRAY_ELEMENT_TYPE_NAME, &[Arg::Int(0)])
            .unwrap_err();
        assert!(elem.is_exception("RuntimeException"));
    }

    #[test]
    fn unknown_path_and_missing_credentials() {
        let (mut rt, store) = seeded();
        let b = rt
            .call_static(&reader::BUILDER, &[Arg::Str("/nowhere")])
            .unwrap()
            .into_object(&reader::BUILDER)
            .unwrap();
        let err = rt.call_method(b, &reader::BUILD, &[]).unwrap_err();
        assert!(err.is_exception("FileNotFoundException"));

        let b = rt
            .call_static(&reader::BUILDER, &[Arg::Str("s3a://bucket/people")])
            .unwrap()
            .into_object(&reader::BUILDER)
            .unwrap();
        rt.call_method(b, &reader::WITH_HADOOP_CONF, &[Arg::Str("fs.s3a.endpoint"), Arg::Str("x")])
            .unwrap();
        let err = rt.call_method(b, &reader::BUILD, &[]).unwrap_err();
        assert!(err.is_exception("AccessDeniedException"));
        assert_eq!(store.received("fs.s3a.endpoint").as_deref(), Some("x"));
    }

    #[test]
    fn writer_commits_sorted_rows_on_close() {
        let (mut rt, store) = seeded();
        let b = rt
            .call_static(&writer::BUILDER, &[])
            .unwrap()
            .into_object(&writer::BUILDER)
            .unwrap();
        rt.call_method(b, &writer::OUTPUT_PATH, &[Arg::Str("/out/t")]).unwrap();
        rt.call_method(b, &writer::WITH_CSV_INPUT, &[Arg::Str("[{id:int},{name:string}]")])
            .unwrap();
        rt.call_method(b, &writer::WRITTEN_BY, &[Arg::Str("unit")]).unwrap();
        let sort = vec!["id".to_string()];
        rt.call_method(b, &writer::SORT_BY, &[Arg::StrArray(&sort)]).unwrap();
        let w = rt
            .call_method(b, &writer::BUILD, &[])
            .unwrap()
            .into_object(&writer::BUILD)
            .unwrap();
        for rec in [["3", "c"], ["1", "a"], ["2", "b"]] {
            let rec: Vec<String> = rec.iter().map(|s| s.to_string()).collect();
            rt.call_method(w, &writer::WRITE, &[Arg::StrArray(&rec)]).unwrap();
        }
        let bad: Vec<String> = vec!["x".into(), "y".into()];
        let err = rt.call_method(w, &writer::WRITE, &[Arg::StrArray(&bad)]).unwrap_err();
        assert!(err.is_exception("NumberFormatException"));
        rt.call_method(w, &writer::CLOSE, &[]).unwrap();
        rt.call_method(w, &writer::CLOSE, &[]).unwrap();

        let ids: Vec<Value> = store.rows("/out/t").into_iter().map(|r| r[0].clone()).collect();
        assert_eq!(ids, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn writer_build_requires_written_by() {
        let (mut rt, _) = seeded();
        let b = rt
            .call_static(&writer::BUILDER, &[])
            .unwrap()
            .into_object(&writer::BUILDER)
            .unwrap();
        rt.call_method(b, &writer::OUTPUT_PATH, &[Arg::Str("/out/t")]).unwrap();
        rt.call_method(b, &writer::WITH_CSV_INPUT, &[Arg::Str("[{id:int}]")]).unwrap();
        let err = rt.call_method(b, &writer::BUILD, &[]).unwrap_err();
        assert!(err.is_exception("IllegalArgumentException"));
    }

    #[test]
    fn release_and_shutdown() {
        let (mut rt, _) = seeded();
        let r = open(&mut rt, "/data/people");
        assert_eq!(rt.live_objects(), 2);
        rt.release(r).unwrap();
        assert!(rt.release(r).is_err());
        rt.shutdown().unwrap();
        assert!(matches!(
            rt.call_static(&reader::BUILDER, &[Arg::Str("x")]),
            Err(crate::BridgeError::ShutDown)
        ));
    }
}
