//! A managed settings object (`org.apache.hadoop.conf.Configuration`).

use carbonr_bridge::carbon::conf as m;
use carbonr_bridge::{Arg, ObjectRef};
use carbonr_core::{BackendOptions, Result};
use tracing::info;

use crate::exception::{translate, Call};
use crate::runtime::{Pinned, Runtime};

pub struct Configuration<'rt> {
    handle: Pinned<'rt>,
}

fn is_secret(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.contains("secret") || key.contains("password") || key.ends_with("access.key")
}

impl<'rt> Configuration<'rt> {
    pub fn new(rt: &'rt Runtime) -> Result<Self> {
        let obj = rt
            .new_object(&m::NEW, &[])
            .map_err(|e| translate("new Configuration", Call::Plain, e))?;
        Ok(Self {
            handle: Pinned::new(rt, obj),
        })
    }

    pub fn from_options(rt: &'rt Runtime, options: &BackendOptions) -> Result<Self> {
        let conf = Self::new(rt)?;
        for (k, v) in options.iter() {
            conf.set(k, v)?;
        }
        Ok(conf)
    }

    /// Set one entry, then read it back and log it. Secret values are
    /// masked in the log.
    pub fn set(&self, key: &str, value: &str) -> Result<&Self> {
        self.handle
            .call(&m::SET, &[Arg::Str(key), Arg::Str(value)])
            .and_then(|r| r.into_void(&m::SET))
            .map_err(|e| translate(&format!("Configuration.set({})", key), Call::Plain, e))?;
        let stored = self.get(key)?;
        let shown = match stored.as_deref() {
            Some(_) if is_secret(key) => "******",
            Some(v) => v,
            None => "<unset>",
        };
        info!(key, value = shown, "configuration entry set");
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.handle
            .call(&m::GET, &[Arg::Str(key)])
            .and_then(|r| r.into_text(&m::GET))
            .map_err(|e| translate(&format!("Configuration.get({})", key), Call::Plain, e))
    }

    pub fn object_ref(&self) -> ObjectRef {
        self.handle.obj()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ReaderBuilder;
    use carbonr_bridge::MemoryStore;
    use carbonr_core::{DataType, Field, Schema, Value};

    #[test]
    fn set_and_get() {
        let rt = Runtime::memory();
        let conf = Configuration::new(&rt).unwrap();
        conf.set("fs.s3a.endpoint", "http://127.0.0.1:9000")
            .unwrap()
            .set("fs.s3a.secret.key", "xyz")
            .unwrap();
        assert_eq!(conf.get("fs.s3a.endpoint").unwrap().as_deref(), Some("http://127.0.0.1:9000"));
        assert_eq!(conf.get("missing").unwrap(), None);
        drop(conf);
        assert_eq!(rt.live_objects(), 0);
    }

    #[test]
    fn secrets_are_recognized() {
        assert!(is_secret("fs.s3a.secret.key"));
        assert!(is_secret("fs.s3a.access.key"));
        assert!(!is_secret("fs.s3a.endpoint"));
    }

    #[test]
    fn reader_receives_configuration_entries() {
        let store = MemoryStore::new();
        store.seed_table(
            "s3a://sdk/t",
            &Schema::new(vec![Field::new("id", DataType::Int)]),
            vec![vec![Value::Int(1)]],
        );
        let rt = Runtime::in_memory(store.clone());
        let conf = Configuration::from_options(&rt, &BackendOptions::s3("ak", "sk", "http://minio")).unwrap();
        let mut reader = ReaderBuilder::with_table(&rt, "s3a://sdk/t", "test")
            .unwrap()
            .with_configuration(&conf)
            .unwrap()
            .build()
            .unwrap();
        assert!(reader.has_next().unwrap());
        reader.close().unwrap();
        assert_eq!(store.received("fs.s3a.access.key").as_deref(), Some("ak"));
    }
}
