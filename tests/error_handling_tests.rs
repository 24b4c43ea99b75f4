//! Error taxonomy, context and suggestions

mod test_data_gen;

use carbonr::bridge::{Arg, BridgeError, ManagedRuntime, MemoryRuntime, Method, ObjectRef, Returned};
use carbonr::{BackendOptions, Error, MemoryStore, ReaderBuilder, Runtime, WriterBuilder};
use test_data_gen::{fixture_schema, fixture_rows, seeded_runtime, FIXTURE_PATH};

/// Memory backend that fails the first `close` calls and can report a
/// negative row length.
struct FaultyBackend {
    inner: MemoryRuntime,
    failing_closes: usize,
    negative_length: bool,
}

impl FaultyBackend {
    fn runtime(store: MemoryStore, failing_closes: usize, negative_length: bool) -> Runtime {
        Runtime::with_backend(Box::new(FaultyBackend {
            inner: MemoryRuntime::with_store(store),
            failing_closes,
            negative_length,
        }))
    }
}

impl ManagedRuntime for FaultyBackend {
    fn name(&self) -> &'static str {
        "faulty"
    }

    fn new_object(&mut self, ctor: &Method, args: &[Arg<'_>]) -> carbonr::bridge::Result<ObjectRef> {
        self.inner.new_object(ctor, args)
    }

    fn call_static(&mut self, method: &Method, args: &[Arg<'_>]) -> carbonr::bridge::Result<Returned> {
        self.inner.call_static(method, args)
    }

    fn call_method(
        &mut self,
        target: ObjectRef,
        method: &Method,
        args: &[Arg<'_>],
    ) -> carbonr::bridge::Result<Returned> {
        if method.name == "close" && self.failing_closes > 0 {
            self.failing_closes -= 1;
            return Err(BridgeError::Exception {
                class: "java.io.IOException".into(),
                message: "disk full".into(),
            });
        }
        if method.name == "getLength" && self.negative_length {
            return Ok(Returned::Int(-1));
        }
        self.inner.call_method(target, method, args)
    }

    fn release(&mut self, obj: ObjectRef) -> carbonr::bridge::Result<()> {
        self.inner.release(obj)
    }

    fn live_objects(&self) -> usize {
        self.inner.live_objects()
    }

    fn shutdown(&mut self) -> carbonr::bridge::Result<()> {
        self.inner.shutdown()
    }
}

#[test]
fn test_error_with_context() {
    let contextual = Error::Exhausted.with_context("while reading s3a://bucket/table");
    match &contextual {
        Error::Context { context, .. } => assert_eq!(context, "while reading s3a://bucket/table"),
        other => panic!("Expected Context variant, got {:?}", other),
    }
    assert!(contextual.is_end_of_data());
    assert!(!Error::Closed("reader").is_end_of_data());
}

#[test]
fn test_build_error_suggestions() {
    let rt = Runtime::memory();
    let err = ReaderBuilder::new(&rt, "/does/not/exist").unwrap().build().err().unwrap();
    assert!(err.to_string().contains("/does/not/exist"));
    assert!(err.suggestions().iter().any(|s| s.contains("/does/not/exist")));
}

#[test]
fn test_projection_error_suggestions() {
    let (rt, _) = seeded_runtime(1);
    let err = ReaderBuilder::new(&rt, FIXTURE_PATH)
        .unwrap()
        .projection(["ghost"])
        .unwrap()
        .build()
        .err()
        .unwrap();
    assert!(err.suggestions().iter().any(|s| s.contains("column")));
}

#[test]
fn test_native_argument_checks_never_reach_the_backend() {
    let (rt, store) = seeded_runtime(1);
    let before = store.total_calls();
    let builder = ReaderBuilder::new(&rt, FIXTURE_PATH).unwrap();
    assert!(matches!(builder.with_batch(0), Err(Error::Config(_))));
    assert_eq!(store.total_calls(), before + 1);

    let mut reader = ReaderBuilder::new(&rt, FIXTURE_PATH).unwrap().build().unwrap();
    assert!(matches!(reader.read_next_batch_row(0), Err(Error::Config(_))));
    reader.close().unwrap();

    let writer = WriterBuilder::new(&rt).unwrap();
    assert!(matches!(writer.with_block_size(4096), Err(Error::Config(_))));
}

#[test]
fn test_malformed_pairs_are_config_errors() {
    let (rt, _) = seeded_runtime(1);
    let builder = ReaderBuilder::new(&rt, FIXTURE_PATH).unwrap();
    let err = builder.with_hadoop_conf_pairs(["missing-equals"]).err().unwrap();
    assert!(matches!(err, Error::Config(_)));
    assert!(BackendOptions::parse_pairs(["=v"]).is_err());
}

#[test]
fn test_bad_record_carries_its_position() {
    let rt = Runtime::memory();
    let mut writer = WriterBuilder::new(&rt)
        .unwrap()
        .output_path("/out/t")
        .unwrap()
        .with_csv_input("[{id:int},{name:string}]")
        .unwrap()
        .build()
        .unwrap();
    writer.write(&["1", "ok"]).unwrap();
    let err = writer.write(&["two", "bad"]).err().unwrap();
    let text = err.to_string();
    assert!(text.contains("record 1"), "{}", text);
    assert!(text.contains("NumberFormatException"), "{}", text);
    writer.close().unwrap();
}

#[test]
fn test_runtime_shutdown_after_release() {
    let rt = Runtime::memory();
    let builder = WriterBuilder::new(&rt).unwrap();
    drop(builder);
    rt.shutdown().unwrap();
}

#[test]
fn test_failed_reader_close_can_be_retried() {
    let store = MemoryStore::new();
    store.seed_table(FIXTURE_PATH, &fixture_schema(), fixture_rows(2));
    let rt = FaultyBackend::runtime(store.clone(), 1, false);
    let mut reader = ReaderBuilder::new(&rt, FIXTURE_PATH).unwrap().build().unwrap();

    let err = reader.close().err().unwrap();
    assert!(err.to_string().contains("disk full"), "{}", err);
    assert!(!reader.is_closed());
    assert!(reader.has_next().unwrap());

    reader.close().unwrap();
    assert!(reader.is_closed());
    assert_eq!(store.calls("CarbonReader.close"), 1);
}

#[test]
fn test_failed_writer_close_can_be_retried() {
    let store = MemoryStore::new();
    let rt = FaultyBackend::runtime(store.clone(), 1, false);
    let mut writer = WriterBuilder::new(&rt)
        .unwrap()
        .output_path("/out/retry")
        .unwrap()
        .with_csv_input("[{id:int}]")
        .unwrap()
        .build()
        .unwrap();
    writer.write(&["7"]).unwrap();

    assert!(writer.close().is_err());
    assert_eq!(store.row_count("/out/retry"), 0);
    writer.close().unwrap();
    assert_eq!(store.row_count("/out/retry"), 1);
}

#[test]
fn test_negative_row_length_is_reported() {
    let store = MemoryStore::new();
    store.seed_table(FIXTURE_PATH, &fixture_schema(), fixture_rows(1));
    let rt = FaultyBackend::runtime(store, 0, true);
    let mut reader = ReaderBuilder::new(&rt, FIXTURE_PATH).unwrap().build().unwrap();
    let row = reader.read_next_row().unwrap();
    match row.accessor().length() {
        Err(Error::Managed { operation, message, .. }) => {
            assert_eq!(operation, "getLength");
            assert!(message.contains("-1"));
        }
        other => panic!("unexpected {:?}", other),
    }
    drop(row);
    reader.close().unwrap();
}
