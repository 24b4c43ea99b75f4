#![forbid(unsafe_code)]
//! carbonr-core: shared kernel for the carbonr bindings.
//!
//! This crate contains only *pure* types and small helpers. There is **no
//! JNI**, **no I/O** and **no runtime handle** here.
//!
//! Crates that use this:
//! - carbonr-bridge: marshals `Value`s and schemas across the embedding bridge.
//! - carbonr-sdk: exposes typed getters, schema reading and config on top of the bridge.
//! - carbonr-cli: loads `RuntimeConfig`/`BackendOptions` from YAML and flags.

pub mod config;
pub mod error;
pub mod schema;
pub mod types;
pub mod value;

pub use config::{BackendOptions, RuntimeConfig};
pub use error::{Error, Result};
pub use schema::{Field, Schema};
pub use types::DataType;
pub use value::Value;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
