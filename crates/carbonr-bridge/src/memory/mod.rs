//! In-process backend interpreting the CarbonData SDK signatures.
//!
//! Handles, return kinds and exceptions mirror the JVM backend, so the SDK
//! façade runs unchanged on top of it. Table data lives in a `MemoryStore`
//! that outlives the runtime and can be inspected by tests.

mod dispatch;
mod store;

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use carbonr_core::{BackendOptions, DataType, Field, Schema, Value};
use tracing::{debug, info};

pub use store::{ConfigEntry, FileKind, MemoryStore, StoredFile, SDK_VERSION};

use crate::call::{Arg, Method, MethodKind, ObjectRef, Returned};
use crate::error::{BridgeError, Result};
use crate::runtime::ManagedRuntime;

#[derive(Debug, Clone)]
pub(crate) struct ReaderBuilderState {
    path: String,
    table: String,
    projection: Option<Vec<String>>,
    conf: BackendOptions,
    batch: Option<i32>,
}

#[derive(Debug)]
pub(crate) struct ReaderState {
    schema: Rc<Schema>,
    rows: Vec<Vec<Value>>,
    cursor: usize,
    closed: bool,
}

#[derive(Debug)]
pub(crate) struct RowState {
    schema: Rc<Schema>,
    values: Vec<Value>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct WriterBuilderState {
    path: Option<String>,
    schema: Option<Schema>,
    conf: BackendOptions,
    written_by: Option<String>,
    sort_by: Vec<String>,
    block_size_mb: Option<i32>,
    blocklet_size_mb: Option<i32>,
    unique_id: Option<i64>,
}

#[derive(Debug)]
pub(crate) struct WriterState {
    path: String,
    schema: Schema,
    rows: Vec<Vec<Value>>,
    written_by: String,
    sort_by: Vec<usize>,
    closed: bool,
}

/// A `DataType` (or `ArrayType` when `element` is set) object.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TypeDesc {
    data_type: DataType,
    element: Option<DataType>,
}

#[derive(Debug)]
pub(crate) enum Obj {
    ReaderBuilder(ReaderBuilderState),
    Reader(ReaderState),
    Row(RowState),
    WriterBuilder(WriterBuilderState),
    Writer(WriterState),
    Schema(Schema),
    Field(Field),
    Type(TypeDesc),
    Configuration(BTreeMap<String, String>),
}

impl Obj {
    fn kind(&self) -> &'static str {
        match self {
            Obj::ReaderBuilder(_) => "CarbonReaderBuilder",
            Obj::Reader(_) => "CarbonReader",
            Obj::Row(_) => "Row",
            Obj::WriterBuilder(_) => "CarbonWriterBuilder",
            Obj::Writer(_) => "CarbonWriter",
            Obj::Schema(_) => "Schema",
            Obj::Field(_) => "Field",
            Obj::Type(_) => "DataType",
            Obj::Configuration(_) => "Configuration",
        }
    }
}

type Handler = fn(&mut MemoryRuntime, Option<ObjectRef>, &[Arg<'_>]) -> Result<Returned>;

pub struct MemoryRuntime {
    store: MemoryStore,
    objects: HashMap<u64, Obj>,
    next_id: u64,
    handlers: HashMap<Method, Handler>,
    shut_down: bool,
}

impl MemoryRuntime {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    /// Backend over an existing store, so data survives across runtimes.
    pub fn with_store(store: MemoryStore) -> Self {
        info!("memory runtime started");
        Self {
            store,
            objects: HashMap::new(),
            next_id: 0,
            handlers: dispatch::handlers(),
            shut_down: false,
        }
    }

    pub fn store(&self) -> MemoryStore {
        self.store.clone()
    }

    fn pin(&mut self, obj: Obj) -> ObjectRef {
        self.next_id += 1;
        self.objects.insert(self.next_id, obj);
        ObjectRef::from_raw(self.next_id)
    }

    fn get(&self, obj: ObjectRef) -> Result<&Obj> {
        self.objects
            .get(&obj.raw())
            .ok_or(BridgeError::InvalidHandle(obj.raw()))
    }

    fn get_mut(&mut self, obj: ObjectRef) -> Result<&mut Obj> {
        self.objects
            .get_mut(&obj.raw())
            .ok_or(BridgeError::InvalidHandle(obj.raw()))
    }

    fn dispatch(
        &mut self,
        kind: MethodKind,
        target: Option<ObjectRef>,
        method: &Method,
        args: &[Arg<'_>],
    ) -> Result<Returned> {
        if self.shut_down {
            return Err(BridgeError::ShutDown);
        }
        if method.kind != kind {
            return Err(BridgeError::BadArguments {
                method: method.name,
                message: format!("{:?} method invoked as {:?}", method.kind, kind),
            });
        }
        let handler = *self
            .handlers
            .get(method)
            .ok_or_else(|| method.no_such_method())?;
        self.store.count_call(method);
        debug!(class = method.class, method = method.name, target = ?target.map(|t| t.raw()), "memory call");
        handler(self, target, args)
    }
}

impl Default for MemoryRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ManagedRuntime for MemoryRuntime {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn new_object(&mut self, ctor: &Method, args: &[Arg<'_>]) -> Result<ObjectRef> {
        self.dispatch(MethodKind::Constructor, None, ctor, args)?
            .into_object(ctor)
    }

    fn call_static(&mut self, method: &Method, args: &[Arg<'_>]) -> Result<Returned> {
        self.dispatch(MethodKind::Static, None, method, args)
    }

    fn call_method(&mut self, target: ObjectRef, method: &Method, args: &[Arg<'_>]) -> Result<Returned> {
        self.dispatch(MethodKind::Instance, Some(target), method, args)
    }

    fn release(&mut self, obj: ObjectRef) -> Result<()> {
        if self.shut_down {
            return Err(BridgeError::ShutDown);
        }
        self.objects
            .remove(&obj.raw())
            .map(|_| ())
            .ok_or(BridgeError::InvalidHandle(obj.raw()))
    }

    fn live_objects(&self) -> usize {
        self.objects.len()
    }

    fn shutdown(&mut self) -> Result<()> {
        if self.shut_down {
            return Err(BridgeError::ShutDown);
        }
        info!(leaked = self.objects.len(), "memory runtime shut down");
        self.objects.clear();
        self.shut_down = true;
        Ok(())
    }
}
