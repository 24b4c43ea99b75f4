//! Reader builder and reader over a CarbonData table.
//!
//! ```no_run
//! use carbonr_sdk::{ReaderBuilder, RowAccessor, Runtime};
//!
//! # fn main() -> carbonr_core::Result<()> {
//! let rt = Runtime::memory();
//! let mut reader = ReaderBuilder::with_table(&rt, "/data/table", "test")?
//!     .projection(["stringField", "intField"])?
//!     .build()?;
//! let mut row = RowAccessor::new(&rt);
//! while reader.has_next()? {
//!     let handle = reader.read_next_row()?;
//!     row.set_row(&handle);
//!     println!("{}", row.format_row()?);
//! }
//! reader.close()?;
//! # Ok(())
//! # }
//! ```

use carbonr_bridge::carbon::reader as m;
use carbonr_bridge::Arg;
use carbonr_core::{BackendOptions, Error, Result};
use tracing::{debug, info, warn};

use crate::configuration::Configuration;
use crate::exception::{translate, Call};
use crate::row::RowHandle;
use crate::runtime::{Pinned, Runtime};

/// Table name the managed single-argument `builder(path)` uses.
pub const DEFAULT_TABLE: &str = "_temp";

pub struct ReaderBuilder<'rt> {
    handle: Pinned<'rt>,
    path: String,
    batch: Option<usize>,
}

impl<'rt> ReaderBuilder<'rt> {
    /// `CarbonReader.builder(path)`; the managed side picks the table name.
    pub fn new(rt: &'rt Runtime, path: &str) -> Result<Self> {
        Self::builder(rt, path, None)
    }

    pub fn with_table(rt: &'rt Runtime, path: &str, table: &str) -> Result<Self> {
        Self::builder(rt, path, Some(table))
    }

    pub fn builder(rt: &'rt Runtime, path: &str, table: Option<&str>) -> Result<Self> {
        let returned = match table {
            Some(table) => rt.call_static(&m::BUILDER_WITH_TABLE, &[Arg::Str(path), Arg::Str(table)]),
            None => rt.call_static(&m::BUILDER, &[Arg::Str(path)]),
        };
        let obj = returned
            .and_then(|r| r.into_object(&m::BUILDER))
            .map_err(|e| translate(&format!("CarbonReader.builder({})", path), Call::Plain, e))?;
        debug!(path, table = table.unwrap_or(DEFAULT_TABLE), "reader builder created");
        Ok(Self {
            handle: Pinned::new(rt, obj),
            path: path.to_string(),
            batch: None,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Columns to read, in this order; duplicates are kept. An empty list
    /// means all columns and issues no managed call.
    pub fn projection<I, S>(self, columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Ok(self);
        }
        self.handle
            .chain(&m::PROJECTION, &[Arg::StrArray(&columns)])
            .map_err(|e| translate("projection", Call::Plain, e))?;
        Ok(self)
    }

    /// One backend option; repeatable, the last value for a key wins.
    pub fn with_hadoop_conf(self, key: &str, value: &str) -> Result<Self> {
        self.handle
            .chain(&m::WITH_HADOOP_CONF, &[Arg::Str(key), Arg::Str(value)])
            .map_err(|e| translate(&format!("withHadoopConf({})", key), Call::Plain, e))?;
        Ok(self)
    }

    /// Same as `with_hadoop_conf`.
    pub fn with_config(self, key: &str, value: &str) -> Result<Self> {
        self.with_hadoop_conf(key, value)
    }

    pub fn with_backend_options(self, options: &BackendOptions) -> Result<Self> {
        options
            .iter()
            .try_fold(self, |b, (k, v)| b.with_hadoop_conf(k, v))
    }

    /// `key=value` arguments, as taken from a command line.
    pub fn with_hadoop_conf_pairs<I, S>(self, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let options = BackendOptions::parse_pairs(pairs)?;
        self.with_backend_options(&options)
    }

    /// Hand a whole settings object to the reader.
    pub fn with_configuration(self, conf: &Configuration<'_>) -> Result<Self> {
        self.handle
            .chain(&m::WITH_CONFIGURATION, &[Arg::Object(conf.object_ref())])
            .map_err(|e| translate("withHadoopConf(Configuration)", Call::Plain, e))?;
        Ok(self)
    }

    /// Read `size` rows per managed fetch.
    pub fn with_batch(mut self, size: usize) -> Result<Self> {
        let n = i32::try_from(size)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| Error::Config(format!("batch size must be in 1..={}, got {}", i32::MAX, size)))?;
        self.handle
            .chain(&m::WITH_BATCH, &[Arg::Int(n)])
            .map_err(|e| translate("withBatch", Call::Plain, e))?;
        self.batch = Some(size);
        Ok(self)
    }

    pub fn build(self) -> Result<Reader<'rt>> {
        let obj = self
            .handle
            .call(&m::BUILD, &[])
            .and_then(|r| r.into_object(&m::BUILD))
            .map_err(|e| translate("build", Call::Build(&self.path), e))?;
        info!(path = %self.path, batch = ?self.batch, "reader built");
        Ok(Reader {
            handle: self.handle.adopt(obj),
            path: self.path,
            batch: self.batch,
            closed: false,
        })
    }

    /// Set the three `fs.s3a.*` options and build.
    pub fn build_with_s3(self, access_key: &str, secret_key: &str, endpoint: &str) -> Result<Reader<'rt>> {
        self.with_backend_options(&BackendOptions::s3(access_key, secret_key, endpoint))?
            .build()
    }
}

pub struct Reader<'rt> {
    handle: Pinned<'rt>,
    path: String,
    batch: Option<usize>,
    closed: bool,
}

impl<'rt> Reader<'rt> {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn batch_size(&self) -> Option<usize> {
        self.batch
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::Closed("reader"))
        } else {
            Ok(())
        }
    }

    /// True when another row can be read. Does not advance.
    pub fn has_next(&self) -> Result<bool> {
        self.ensure_open()?;
        self.handle
            .call(&m::HAS_NEXT, &[])
            .and_then(|r| r.into_bool(&m::HAS_NEXT))
            .map_err(|e| translate("hasNext", Call::Read, e))
    }

    /// Advance one row. `Error::Exhausted` when none remain.
    pub fn read_next_row(&mut self) -> Result<RowHandle<'rt>> {
        self.ensure_open()?;
        let obj = self
            .handle
            .call(&m::READ_NEXT_ROW, &[])
            .and_then(|r| r.into_object(&m::READ_NEXT_ROW))
            .map_err(|e| translate("readNextCarbonRow", Call::Read, e))?;
        Ok(RowHandle::new(self.handle.adopt(obj)))
    }

    /// Up to `batch_size` rows; fewer at the end of the data.
    pub fn read_next_batch_row(&mut self, batch_size: usize) -> Result<Vec<RowHandle<'rt>>> {
        self.ensure_open()?;
        let n = i32::try_from(batch_size)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| Error::Config(format!("batch size must be in 1..={}, got {}", i32::MAX, batch_size)))?;
        let objs = self
            .handle
            .call(&m::READ_NEXT_BATCH, &[Arg::Int(n)])
            .and_then(|r| r.into_object_array(&m::READ_NEXT_BATCH))
            .map_err(|e| translate("readNextBatchRow", Call::Read, e))?;
        Ok(objs
            .into_iter()
            .map(|obj| RowHandle::new(self.handle.adopt(obj)))
            .collect())
    }

    /// Rows until the end of the data; exhaustion ends the iterator.
    pub fn rows(&mut self) -> Rows<'_, 'rt> {
        Rows {
            reader: self,
            done: false,
        }
    }

    /// Release the managed cursor. A second call is a no-op; a failed close
    /// leaves the reader open so it can be retried.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.handle
            .call(&m::CLOSE, &[])
            .and_then(|r| r.into_void(&m::CLOSE))
            .map_err(|e| translate(&format!("close({})", self.path), Call::Plain, e))?;
        self.closed = true;
        info!(path = %self.path, "reader closed");
        Ok(())
    }
}

impl Drop for Reader<'_> {
    fn drop(&mut self) {
        if !self.closed {
            warn!(path = %self.path, "reader dropped without close()");
            if let Err(e) = self.close() {
                warn!(error = %e, "implicit close failed");
            }
        }
    }
}

pub struct Rows<'a, 'rt> {
    reader: &'a mut Reader<'rt>,
    done: bool,
}

impl<'rt> Iterator for Rows<'_, 'rt> {
    type Item = Result<RowHandle<'rt>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.has_next() {
            Ok(true) => {}
            Ok(false) => {
                self.done = true;
                return None;
            }
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        }
        match self.reader.read_next_row() {
            Err(e) if e.is_end_of_data() => {
                self.done = true;
                None
            }
            other => Some(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carbonr_bridge::MemoryStore;
    use carbonr_core::{DataType, Field, Schema, Value};

    fn runtime_with_rows(n: i32) -> (Runtime, MemoryStore) {
        let store = MemoryStore::new();
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int),
            Field::new("name", DataType::String),
        ]);
        let rows = (0..n)
            .map(|i| vec![Value::Int(i), Value::String(format!("n{}", i))])
            .collect();
        store.seed_table("/t", &schema, rows);
        (Runtime::in_memory(store.clone()), store)
    }

    #[test]
    fn has_next_is_a_peek() {
        let (rt, _) = runtime_with_rows(1);
        let mut reader = ReaderBuilder::new(&rt, "/t").unwrap().build().unwrap();
        assert!(reader.has_next().unwrap());
        assert!(reader.has_next().unwrap());
        let _row = reader.read_next_row().unwrap();
        assert!(!reader.has_next().unwrap());
        assert!(matches!(reader.read_next_row(), Err(Error::Exhausted)));
        reader.close().unwrap();
    }

    #[test]
    fn empty_projection_issues_no_call() {
        let (rt, store) = runtime_with_rows(1);
        let builder = ReaderBuilder::new(&rt, "/t")
            .unwrap()
            .projection(Vec::<String>::new())
            .unwrap();
        assert_eq!(store.calls("CarbonReaderBuilder.projection"), 0);
        drop(builder);
    }

    #[test]
    fn zero_batch_is_rejected_natively() {
        let (rt, store) = runtime_with_rows(1);
        let builder = ReaderBuilder::new(&rt, "/t").unwrap();
        assert!(matches!(builder.with_batch(0), Err(Error::Config(_))));
        assert_eq!(store.calls("CarbonReaderBuilder.withBatch"), 0);
    }

    #[test]
    fn closed_reader_rejects_reads_and_double_close_is_ok() {
        let (rt, _) = runtime_with_rows(2);
        let mut reader = ReaderBuilder::new(&rt, "/t").unwrap().build().unwrap();
        reader.close().unwrap();
        reader.close().unwrap();
        assert!(matches!(reader.has_next(), Err(Error::Closed("reader"))));
        assert!(matches!(reader.read_next_row(), Err(Error::Closed(_))));
        assert!(matches!(reader.read_next_batch_row(1), Err(Error::Closed(_))));
    }

    #[test]
    fn rows_iterator_ends_at_exhaustion() {
        let (rt, _) = runtime_with_rows(5);
        let mut reader = ReaderBuilder::new(&rt, "/t")
            .unwrap()
            .with_batch(2)
            .unwrap()
            .build()
            .unwrap();
        let count = reader.rows().filter(|r| r.is_ok()).count();
        assert_eq!(count, 5);
        assert!(reader.rows().next().is_none());
        reader.close().unwrap();
    }

    #[test]
    fn handles_are_released() {
        let (rt, _) = runtime_with_rows(3);
        {
            let mut reader = ReaderBuilder::new(&rt, "/t").unwrap().build().unwrap();
            let batch = reader.read_next_batch_row(10).unwrap();
            assert_eq!(batch.len(), 3);
            drop(batch);
            assert_eq!(rt.live_objects(), 1);
            reader.close().unwrap();
        }
        assert_eq!(rt.live_objects(), 0);
    }

    #[test]
    fn missing_path_is_a_build_error() {
        let (rt, _) = runtime_with_rows(1);
        let err = ReaderBuilder::new(&rt, "/missing").unwrap().build().err().unwrap();
        assert!(matches!(err, Error::Build { ref path, .. } if path == "/missing"));
    }
}
