//! The runtime handle every proxy borrows.
//!
//! One `Runtime` per process. Readers, writers, rows and configurations hold
//! `&Runtime`, so none of them can outlive `shutdown`. The backend sits in a
//! `RefCell`: proxies are single-threaded (`!Sync`) by construction.

use std::cell::{Cell, RefCell};

use carbonr_bridge::{Arg, BridgeError, ManagedRuntime, MemoryRuntime, MemoryStore, Method, ObjectRef, Returned};
use carbonr_core::{Error, Result};
use tracing::{debug, info, warn};

#[cfg(feature = "jvm")]
use carbonr_core::RuntimeConfig;

pub struct Runtime {
    backend: RefCell<Box<dyn ManagedRuntime>>,
    name: &'static str,
    shut_down: Cell<bool>,
}

impl Runtime {
    /// Start the embedded JVM. A second start in the same process fails.
    #[cfg(feature = "jvm")]
    pub fn start(config: &RuntimeConfig) -> Result<Self> {
        let jvm = carbonr_bridge::JvmRuntime::start(config).map_err(|e| match e {
            BridgeError::Startup(msg) => Error::Startup(msg),
            other => Error::Startup(other.to_string()),
        })?;
        Ok(Self::with_backend(Box::new(jvm)))
    }

    pub fn with_backend(backend: Box<dyn ManagedRuntime>) -> Self {
        let name = backend.name();
        info!(backend = name, "runtime ready");
        Self {
            backend: RefCell::new(backend),
            name,
            shut_down: Cell::new(false),
        }
    }

    /// In-process backend over a fresh, empty store.
    pub fn memory() -> Self {
        Self::in_memory(MemoryStore::new())
    }

    /// In-process backend over `store`; keep a clone of the store to seed
    /// tables or inspect what the backend received.
    pub fn in_memory(store: MemoryStore) -> Self {
        Self::with_backend(Box::new(MemoryRuntime::with_store(store)))
    }

    pub fn backend_name(&self) -> &'static str {
        self.name
    }

    /// Objects currently pinned on the managed side.
    pub fn live_objects(&self) -> usize {
        self.backend.borrow().live_objects()
    }

    pub(crate) fn call_static(&self, method: &Method, args: &[Arg<'_>]) -> std::result::Result<Returned, BridgeError> {
        self.backend.borrow_mut().call_static(method, args)
    }

    pub(crate) fn call(
        &self,
        target: ObjectRef,
        method: &Method,
        args: &[Arg<'_>],
    ) -> std::result::Result<Returned, BridgeError> {
        self.backend.borrow_mut().call_method(target, method, args)
    }

    pub(crate) fn new_object(&self, ctor: &Method, args: &[Arg<'_>]) -> std::result::Result<ObjectRef, BridgeError> {
        self.backend.borrow_mut().new_object(ctor, args)
    }

    pub(crate) fn release(&self, obj: ObjectRef) -> std::result::Result<(), BridgeError> {
        self.backend.borrow_mut().release(obj)
    }

    /// Tear the runtime down. Consumes the handle, so no proxy survives it.
    pub fn shutdown(self) -> Result<()> {
        self.stop()
    }

    fn stop(&self) -> Result<()> {
        if self.shut_down.replace(true) {
            return Ok(());
        }
        let live = self.live_objects();
        if live > 0 {
            warn!(live, "objects still pinned at shutdown");
        }
        self.backend
            .borrow_mut()
            .shutdown()
            .map_err(|e| Error::Bridge(e.to_string()))?;
        info!(backend = self.name, "runtime shut down");
        Ok(())
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!(error = %e, "runtime shutdown on drop failed");
        }
    }
}

/// A managed object pinned for as long as this value lives.
pub(crate) struct Pinned<'rt> {
    rt: &'rt Runtime,
    obj: ObjectRef,
}

impl<'rt> Pinned<'rt> {
    pub(crate) fn new(rt: &'rt Runtime, obj: ObjectRef) -> Self {
        Self { rt, obj }
    }

    pub(crate) fn runtime(&self) -> &'rt Runtime {
        self.rt
    }

    pub(crate) fn obj(&self) -> ObjectRef {
        self.obj
    }

    pub(crate) fn call(&self, method: &Method, args: &[Arg<'_>]) -> std::result::Result<Returned, BridgeError> {
        self.rt.call(self.obj, method, args)
    }

    /// Builder-style call returning `this`; drops the extra reference the
    /// backend may have pinned for the return value.
    pub(crate) fn chain(&self, method: &Method, args: &[Arg<'_>]) -> std::result::Result<(), BridgeError> {
        let returned = self.call(method, args)?.into_object(method)?;
        if returned != self.obj {
            self.rt.release(returned)?;
        }
        Ok(())
    }

    /// Pin a returned object so it is released with the new value.
    pub(crate) fn adopt(&self, obj: ObjectRef) -> Pinned<'rt> {
        Pinned::new(self.rt, obj)
    }
}

impl Drop for Pinned<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.rt.release(self.obj) {
            debug!(obj = self.obj.raw(), error = %e, "release failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carbonr_bridge::carbon::conf;

    #[test]
    fn pinned_objects_are_released_on_drop() {
        let rt = Runtime::memory();
        {
            let obj = rt.new_object(&conf::NEW, &[]).unwrap();
            let _pinned = Pinned::new(&rt, obj);
            assert_eq!(rt.live_objects(), 1);
        }
        assert_eq!(rt.live_objects(), 0);
        rt.shutdown().unwrap();
    }

    #[test]
    fn chain_keeps_a_single_reference() {
        let rt = Runtime::memory();
        let b = rt
            .call_static(&carbonr_bridge::carbon::reader::BUILDER, &[Arg::Str("/t")])
            .unwrap()
            .into_object(&carbonr_bridge::carbon::reader::BUILDER)
            .unwrap();
        let pinned = Pinned::new(&rt, b);
        pinned
            .chain(&carbonr_bridge::carbon::reader::WITH_BATCH, &[Arg::Int(10)])
            .unwrap();
        assert_eq!(rt.live_objects(), 1);
        drop(pinned);
        assert_eq!(rt.live_objects(), 0);
    }
}
