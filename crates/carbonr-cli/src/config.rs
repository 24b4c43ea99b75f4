//! Session file and command-line overrides.
//!
//! ```yaml
//! backend_kind: memory
//! runtime:
//!   classpath: ["../../sdk/target/carbondata-sdk.jar"]
//!   verbose_jni: false
//!   jvm_options: ["-Xmx4g"]
//! backend:
//!   fs.s3a.endpoint: http://127.0.0.1:9000
//! ```

use std::path::{Path, PathBuf};

use carbonr_core::{BackendOptions, RuntimeConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read session file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid session file '{path}': {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("csv input: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("backend '{0}' is not available in this build (rebuild with --features jvm)")]
    BackendUnavailable(&'static str),

    #[error(transparent)]
    Carbon(#[from] carbonr_core::Error),
}

impl CliError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            CliError::Carbon(e) => e.suggestions(),
            CliError::Io { .. } => vec!["Check the --config path".into()],
            CliError::Yaml { .. } => {
                vec!["The session file has `backend_kind`, `runtime` and `backend` sections".into()]
            }
            CliError::BackendUnavailable(_) => vec!["Use --backend memory".into()],
            CliError::Csv(_) => vec!["The first CSV line must be a header naming every column".into()],
            CliError::Output(_) => vec![],
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process backend seeded with a demo table.
    #[default]
    Memory,
    /// Embedded JVM running the CarbonData SDK.
    Jvm,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub backend_kind: BackendKind,
    pub runtime: RuntimeConfig,
    pub backend: BackendOptions,
}

/// Flags that win over the session file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub backend_kind: Option<BackendKind>,
    pub classpath: Vec<String>,
    pub verbose_jni: bool,
    /// `key=value` backend options.
    pub options: Vec<String>,
}

impl SessionConfig {
    pub fn from_yaml_str(text: &str, origin: &Path) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|source| CliError::Yaml {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text, path)
    }

    /// The session file if given, else defaults taken from the environment.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self {
                runtime: RuntimeConfig::from_env(),
                ..Self::default()
            }),
        }
    }

    pub fn apply(&mut self, overrides: &Overrides) -> Result<()> {
        if let Some(kind) = overrides.backend_kind {
            self.backend_kind = kind;
        }
        if !overrides.classpath.is_empty() {
            self.runtime.classpath = overrides.classpath.clone();
        }
        if overrides.verbose_jni {
            self.runtime.verbose_jni = true;
        }
        let pairs = BackendOptions::parse_pairs(&overrides.options)?;
        self.backend.merge(&pairs);
        Ok(())
    }
}
