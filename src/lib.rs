//! carbonr: native bindings for the CarbonData SDK.
//!
//! Umbrella crate re-exporting the façade. Most users only need this crate;
//! the workspace members are split the same way the façade is layered:
//! - `carbonr-core`: types, values, schema, config, errors (no I/O, no JNI).
//! - `carbonr-bridge`: the embedding bridge (in-memory backend, JVM behind `jvm`).
//! - `carbonr-sdk`: runtime, reader/writer builders, row accessor, schema reader.

pub use carbonr_bridge as bridge;
pub use carbonr_core as core;
pub use carbonr_sdk::*;
