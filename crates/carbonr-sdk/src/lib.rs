//! carbonr-sdk: typed native façade over the CarbonData SDK.
//!
//! Everything here borrows a [`Runtime`]. The borrow checker enforces what
//! the managed side cannot: no reader, writer, row or configuration outlives
//! the runtime, and every pinned managed object is released when its proxy
//! is dropped.
//!
//! Errors are the shared `carbonr_core::Error`. End of data surfaces as
//! `Error::Exhausted`; use `Error::is_end_of_data` to test for it.

pub mod configuration;
mod exception;
pub mod reader;
pub mod row;
pub mod runtime;
pub mod schema_reader;
pub mod writer;

pub use configuration::Configuration;
pub use reader::{Reader, ReaderBuilder, Rows, DEFAULT_TABLE};
pub use row::{RowAccessor, RowHandle};
pub use runtime::Runtime;
pub use schema_reader::SchemaReader;
pub use writer::{Writer, WriterBuilder};

pub use carbonr_bridge::MemoryStore;
pub use carbonr_core::{BackendOptions, DataType, Error, Field, Result, RuntimeConfig, Schema, Value};
