//! carbonr-cli: session handling and scenarios for the `carbonr` binary.

pub mod config;
pub mod fixture;
pub mod scenarios;

pub use config::{BackendKind, CliError, Overrides, SessionConfig};

use carbonr_sdk::{MemoryStore, Runtime};
use tracing::info;

/// Start the backend the session asks for. The memory backend comes up
/// seeded with the demo tables.
pub fn open_runtime(session: &SessionConfig, bench_rows: usize) -> config::Result<Runtime> {
    match session.backend_kind {
        BackendKind::Memory => {
            let store = MemoryStore::new();
            fixture::seed_demo(&store, bench_rows);
            info!(bench_rows, "memory backend seeded");
            Ok(Runtime::in_memory(store))
        }
        BackendKind::Jvm => start_jvm(session),
    }
}

#[cfg(feature = "jvm")]
fn start_jvm(session: &SessionConfig) -> config::Result<Runtime> {
    session.runtime.validate()?;
    Ok(Runtime::start(&session.runtime)?)
}

#[cfg(not(feature = "jvm"))]
fn start_jvm(_: &SessionConfig) -> config::Result<Runtime> {
    Err(CliError::BackendUnavailable("jvm"))
}
