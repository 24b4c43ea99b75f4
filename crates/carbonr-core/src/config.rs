//! Runtime and backend configuration.
//!
//! `RuntimeConfig` describes the embedded JVM (classpath plus debug flags);
//! `BackendOptions` is the ordered key/value set handed to the storage layer
//! through `withHadoopConf` (credentials, endpoints).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const S3_ACCESS_KEY: &str = "fs.s3a.access.key";
pub const S3_SECRET_KEY: &str = "fs.s3a.secret.key";
pub const S3_ENDPOINT: &str = "fs.s3a.endpoint";

/// Default location of the SDK jar relative to a source checkout.
pub const DEFAULT_CLASSPATH: &str = "../../sdk/target/carbondata-sdk.jar";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Jar files and directories joined into `-Djava.class.path`.
    pub classpath: Vec<String>,
    /// `-verbose:jni`, for debugging the bridge.
    pub verbose_jni: bool,
    /// `-Djava.compiler=NONE`, forbids JIT.
    pub disable_jit: bool,
    /// Extra options passed through verbatim (`-Xmx16g`, ...).
    pub jvm_options: Vec<String>,
    pub ignore_unrecognized: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            classpath: vec![DEFAULT_CLASSPATH.to_string()],
            verbose_jni: false,
            disable_jit: false,
            jvm_options: Vec::new(),
            ignore_unrecognized: false,
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by `CARBONR_CLASSPATH` (platform path list),
    /// `CARBONR_JVM_OPTS` (whitespace separated) and `CARBONR_VERBOSE_JNI`.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(cp) = std::env::var("CARBONR_CLASSPATH") {
            let entries: Vec<String> = std::env::split_paths(&cp)
                .map(|p| p.to_string_lossy().into_owned())
                .filter(|p| !p.is_empty())
                .collect();
            if !entries.is_empty() {
                cfg.classpath = entries;
            }
        }
        if let Ok(opts) = std::env::var("CARBONR_JVM_OPTS") {
            cfg.jvm_options = opts.split_whitespace().map(str::to_string).collect();
        }
        if let Ok(v) = std::env::var("CARBONR_VERBOSE_JNI") {
            cfg.verbose_jni = matches!(v.as_str(), "1" | "true" | "yes");
        }
        cfg
    }

    pub fn validate(&self) -> Result<()> {
        if self.classpath.iter().all(|c| c.trim().is_empty()) {
            return Err(Error::Config("classpath is empty".into()));
        }
        if let Some(bad) = self.jvm_options.iter().find(|o| !o.starts_with('-')) {
            return Err(Error::Config(format!("JVM option '{}' must start with '-'", bad)));
        }
        Ok(())
    }

    /// Joined classpath using the platform separator.
    pub fn class_path(&self) -> String {
        let sep = if cfg!(windows) { ";" } else { ":" };
        self.classpath
            .iter()
            .filter(|c| !c.trim().is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(sep)
    }

    /// Option strings in the order the JVM receives them.
    pub fn to_jvm_options(&self) -> Vec<String> {
        let mut out = vec![format!("-Djava.class.path={}", self.class_path())];
        if self.verbose_jni {
            out.push("-verbose:jni".into());
        }
        if self.disable_jit {
            out.push("-Djava.compiler=NONE".into());
        }
        out.extend(self.jvm_options.iter().cloned());
        out
    }
}

/// Ordered backend settings; setting an existing key overwrites it in place.
///
/// Serialized as a plain map, so a YAML `backend:` section reads naturally.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct BackendOptions {
    entries: Vec<(String, String)>,
}

impl BackendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// The three `fs.s3a.*` settings for an S3-compatible store.
    pub fn s3(access_key: &str, secret_key: &str, endpoint: &str) -> Self {
        let mut opts = Self::new();
        opts.set(S3_ACCESS_KEY, access_key);
        opts.set(S3_SECRET_KEY, secret_key);
        opts.set(S3_ENDPOINT, endpoint);
        opts
    }

    /// Parse `key=value` arguments, e.g. `fs.s3a.access.key=XXXX`.
    pub fn parse_pairs<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut opts = Self::new();
        for arg in args {
            let arg = arg.as_ref();
            let (k, v) = arg
                .split_once('=')
                .ok_or_else(|| Error::Config(format!("expected key=value, got '{}'", arg)))?;
            let k = k.trim();
            if k.is_empty() {
                return Err(Error::Config(format!("empty key in '{}'", arg)));
            }
            opts.set(k, v.trim());
        }
        Ok(opts)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn merge(&mut self, other: &BackendOptions) -> &mut Self {
        for (k, v) in other.iter() {
            self.set(k, v);
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<BTreeMap<String, String>> for BackendOptions {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self {
            entries: map.into_iter().collect(),
        }
    }
}

impl From<BackendOptions> for BTreeMap<String, String> {
    fn from(opts: BackendOptions) -> Self {
        opts.entries.into_iter().collect()
    }
}
