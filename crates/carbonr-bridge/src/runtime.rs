//! The seam between the SDK façade and a managed runtime.
//!
//! A backend resolves a `Method` on the managed side, marshals the native
//! arguments, invokes, and hands the result back as an owned `Returned`.
//! Managed exceptions come back as `BridgeError::Exception` and are already
//! cleared from the runtime when the caller sees them.

use crate::call::{Arg, Method, ObjectRef, Returned};
use crate::error::Result;

pub trait ManagedRuntime {
    /// Short backend name for logs ("jvm", "memory").
    fn name(&self) -> &'static str;

    /// Invoke a constructor and pin the new object.
    fn new_object(&mut self, ctor: &Method, args: &[Arg<'_>]) -> Result<ObjectRef>;

    fn call_static(&mut self, method: &Method, args: &[Arg<'_>]) -> Result<Returned>;

    fn call_method(&mut self, target: ObjectRef, method: &Method, args: &[Arg<'_>]) -> Result<Returned>;

    /// Unpin an object. The handle is invalid afterwards.
    fn release(&mut self, obj: ObjectRef) -> Result<()>;

    /// Number of objects currently pinned; used to check for leaks.
    fn live_objects(&self) -> usize;

    /// Tear the runtime down. Every call afterwards fails with `ShutDown`.
    fn shutdown(&mut self) -> Result<()>;
}
