//! Writer builder and writer producing CarbonData files from text records.

use carbonr_bridge::carbon::writer as m;
use carbonr_bridge::Arg;
use carbonr_core::{BackendOptions, Error, Result, Schema, Value, VERSION};
use tracing::{debug, info, warn};

use crate::exception::{translate, Call};
use crate::runtime::{Pinned, Runtime};

/// Accepted range for `with_block_size`, in MB.
pub const BLOCK_SIZE_RANGE: std::ops::RangeInclusive<u32> = 1..=2048;

pub struct WriterBuilder<'rt> {
    handle: Pinned<'rt>,
    path: Option<String>,
    schema: Option<Schema>,
    written_by: bool,
}

impl<'rt> WriterBuilder<'rt> {
    pub fn new(rt: &'rt Runtime) -> Result<Self> {
        let obj = rt
            .call_static(&m::BUILDER, &[])
            .and_then(|r| r.into_object(&m::BUILDER))
            .map_err(|e| translate("CarbonWriter.builder", Call::Plain, e))?;
        Ok(Self {
            handle: Pinned::new(rt, obj),
            path: None,
            schema: None,
            written_by: false,
        })
    }

    fn chain(&self, op: &str, method: &carbonr_bridge::Method, args: &[Arg<'_>]) -> Result<()> {
        self.handle
            .chain(method, args)
            .map_err(|e| translate(op, Call::Plain, e))
    }

    pub fn output_path(mut self, path: &str) -> Result<Self> {
        self.chain("outputPath", &m::OUTPUT_PATH, &[Arg::Str(path)])?;
        self.path = Some(path.to_string());
        Ok(self)
    }

    /// Schema as the JSON-ish text the managed side takes, e.g.
    /// `[{stringField:string},{intField:int}]`.
    pub fn with_csv_input(mut self, schema_json: &str) -> Result<Self> {
        let schema = Schema::parse_json_schema(schema_json)?;
        self.chain("withCsvInput", &m::WITH_CSV_INPUT, &[Arg::Str(schema_json)])?;
        self.schema = Some(schema);
        Ok(self)
    }

    pub fn with_schema(self, schema: &Schema) -> Result<Self> {
        if schema.is_empty() {
            return Err(Error::Schema("writer schema has no fields".into()));
        }
        self.with_csv_input(&schema.to_json_schema())
    }

    pub fn with_hadoop_conf(self, key: &str, value: &str) -> Result<Self> {
        self.chain(&format!("withHadoopConf({})", key), &m::WITH_HADOOP_CONF, &[
            Arg::Str(key),
            Arg::Str(value),
        ])?;
        Ok(self)
    }

    pub fn with_config(self, key: &str, value: &str) -> Result<Self> {
        self.with_hadoop_conf(key, value)
    }

    pub fn with_backend_options(self, options: &BackendOptions) -> Result<Self> {
        options
            .iter()
            .try_fold(self, |b, (k, v)| b.with_hadoop_conf(k, v))
    }

    /// Application name recorded in the file footer. Defaults to
    /// `carbonr <version>` when not set.
    pub fn written_by(mut self, name: &str) -> Result<Self> {
        self.chain("writtenBy", &m::WRITTEN_BY, &[Arg::Str(name)])?;
        self.written_by = true;
        Ok(self)
    }

    pub fn sort_by<I, S>(self, columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        self.chain("sortBy", &m::SORT_BY, &[Arg::StrArray(&columns)])?;
        Ok(self)
    }

    pub fn with_block_size(self, mb: u32) -> Result<Self> {
        if !BLOCK_SIZE_RANGE.contains(&mb) {
            return Err(Error::Config(format!("block size must be 1..=2048 MB, got {}", mb)));
        }
        self.chain("withBlockSize", &m::WITH_BLOCK_SIZE, &[Arg::Int(mb as i32)])?;
        Ok(self)
    }

    pub fn with_blocklet_size(self, mb: u32) -> Result<Self> {
        let n = i32::try_from(mb)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| Error::Config(format!("blocklet size must be positive, got {}", mb)))?;
        self.chain("withBlockletSize", &m::WITH_BLOCKLET_SIZE, &[Arg::Int(n)])?;
        Ok(self)
    }

    /// Timestamp used in output file names.
    pub fn unique_identifier(self, id: i64) -> Result<Self> {
        self.chain("uniqueIdentifier", &m::UNIQUE_IDENTIFIER, &[Arg::Long(id)])?;
        Ok(self)
    }

    pub fn build(self) -> Result<Writer<'rt>> {
        let this = if self.written_by {
            self
        } else {
            self.written_by(&format!("carbonr {}", VERSION))?
        };
        let path = this.path.clone().unwrap_or_default();
        let obj = this
            .handle
            .call(&m::BUILD, &[])
            .and_then(|r| r.into_object(&m::BUILD))
            .map_err(|e| translate("build", Call::Build(&path), e))?;
        info!(path = %path, "writer built");
        Ok(Writer {
            handle: this.handle.adopt(obj),
            path,
            schema: this.schema,
            rows: 0,
            closed: false,
        })
    }
}

pub struct Writer<'rt> {
    handle: Pinned<'rt>,
    path: String,
    schema: Option<Schema>,
    rows: usize,
    closed: bool,
}

impl<'rt> Writer<'rt> {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// One record, one text cell per column. Array cells use
    /// `carbonr_core::value::ARRAY_DELIMITER` between elements.
    pub fn write<S: AsRef<str>>(&mut self, record: &[S]) -> Result<()> {
        if self.closed {
            return Err(Error::Closed("writer"));
        }
        let record: Vec<String> = record.iter().map(|c| c.as_ref().to_string()).collect();
        self.handle
            .call(&m::WRITE, &[Arg::StrArray(&record)])
            .and_then(|r| r.into_void(&m::WRITE))
            .map_err(|e| translate("write", Call::Plain, e).with_context(format!("record {}", self.rows)))?;
        self.rows += 1;
        Ok(())
    }

    pub fn write_values(&mut self, values: &[Value]) -> Result<()> {
        let cells: Vec<String> = values.iter().map(Value::to_cell).collect();
        self.write(&cells)
    }

    /// Flush and finalize the output. A second close is a no-op; a failed
    /// close leaves the writer open so it can be retried.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.handle
            .call(&m::CLOSE, &[])
            .and_then(|r| r.into_void(&m::CLOSE))
            .map_err(|e| translate("close", Call::Plain, e))?;
        self.closed = true;
        debug!(path = %self.path, rows = self.rows, "writer closed");
        Ok(())
    }
}

impl Drop for Writer<'_> {
    fn drop(&mut self) {
        if !self.closed {
            warn!(path = %self.path, "writer dropped without close");
            if let Err(e) = self.close() {
                warn!(error = %e, "closing writer on drop failed");
            }
        }
    }
}
