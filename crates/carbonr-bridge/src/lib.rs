#![deny(unsafe_code)]
//! carbonr-bridge: the embedding bridge between native code and the managed SDK.
//!
//! - `call`: marshaling types (`Arg`, `RetKind`, `Returned`, `ObjectRef`, `Method`).
//! - `runtime`: the `ManagedRuntime` trait every backend implements.
//! - `carbon`: class names and method signatures of the CarbonData SDK.
//! - `memory`: an in-process backend interpreting those signatures (tests, demos).
//! - `jvm`: the JNI backend hosting a real JVM (enabled with `--features jvm`).

pub mod call;
pub mod carbon;
pub mod error;
pub mod memory;
pub mod runtime;

#[cfg(feature = "jvm")]
pub mod jvm;

pub use call::{Arg, Method, MethodKind, ObjectRef, RetKind, Returned};
pub use error::{BridgeError, Result};
pub use memory::{MemoryRuntime, MemoryStore};
pub use runtime::ManagedRuntime;

#[cfg(feature = "jvm")]
pub use jvm::JvmRuntime;
