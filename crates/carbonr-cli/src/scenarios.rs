//! The demo and benchmark scenarios behind each subcommand.
//!
//! Every scenario writes its report to `out` and returns what it counted,
//! so tests can drive them against the in-memory backend.

use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use carbonr_core::{BackendOptions, DataType, Error, Field, Schema};
use carbonr_sdk::{ReaderBuilder, RowAccessor, Runtime, SchemaReader, WriterBuilder};
use tracing::{info, warn};

use crate::config::{CliError, Result};
use crate::fixture::{DEMO_COLUMNS, MISSING_PATH};

/// Timings of one benchmark run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchSummary {
    pub total: usize,
    pub build: Duration,
    pub read: Duration,
}

impl BenchSummary {
    pub fn records_per_sec(&self) -> f64 {
        rate(self.total, self.read)
    }
}

fn rate(records: usize, elapsed: Duration) -> f64 {
    records as f64 / elapsed.as_secs_f64().max(1e-9)
}

fn summary_line(out: &mut dyn Write, s: &BenchSummary) -> Result<()> {
    writeln!(
        out,
        "total line is: {},\t build time is: {:.6} s,\tread time is {:.6} s, average speed is {:.6} records/s",
        s.total,
        s.build.as_secs_f64(),
        s.read.as_secs_f64(),
        s.records_per_sec()
    )?;
    Ok(())
}

/// First few fields of a row, tab-separated.
fn preview(row: &RowAccessor<'_>, fields: usize) -> Result<String> {
    let n = row.length()?.min(fields);
    let cells = (0..n).map(|i| row.format(i)).collect::<carbonr_core::Result<Vec<_>>>()?;
    Ok(cells.join("\t"))
}

/// Print every row of `path`, all columns.
pub fn read_local(rt: &Runtime, path: &str, opts: &BackendOptions, out: &mut dyn Write) -> Result<usize> {
    writeln!(out, "\nRead data from local without projection:")?;
    let mut reader = ReaderBuilder::new(rt, path)?.with_backend_options(opts)?.build()?;
    print_rows(rt, &mut reader, out)
}

/// Print every row of `path` through an explicit projection.
pub fn read_projection(
    rt: &Runtime,
    path: &str,
    table: &str,
    columns: &[String],
    opts: &BackendOptions,
    out: &mut dyn Write,
) -> Result<usize> {
    writeln!(out, "\nRead data from local:")?;
    let columns: Vec<String> = if columns.is_empty() {
        DEMO_COLUMNS.iter().map(|c| c.to_string()).collect()
    } else {
        columns.to_vec()
    };
    let mut reader = ReaderBuilder::with_table(rt, path, table)?
        .projection(columns)?
        .with_backend_options(opts)?
        .build()?;
    print_rows(rt, &mut reader, out)
}

/// Read a remote table with credentials given on the command line.
pub fn read_s3(
    rt: &Runtime,
    path: &str,
    access_key: &str,
    secret_key: &str,
    endpoint: &str,
    opts: &BackendOptions,
    out: &mut dyn Write,
) -> Result<usize> {
    writeln!(out, "\nRead data from S3:")?;
    let start = Instant::now();
    let mut reader = ReaderBuilder::with_table(rt, path, "test")?
        .with_backend_options(opts)?
        .build_with_s3(access_key, secret_key, endpoint)?;
    writeln!(out, "build time: {:.6} s", start.elapsed().as_secs_f64())?;
    let count = print_rows(rt, &mut reader, out)?;
    writeln!(out, "read time: {:.6} s", start.elapsed().as_secs_f64())?;
    Ok(count)
}

fn print_rows(rt: &Runtime, reader: &mut carbonr_sdk::Reader<'_>, out: &mut dyn Write) -> Result<usize> {
    let mut row = RowAccessor::new(rt);
    let mut count = 0;
    while reader.has_next()? {
        let handle = reader.read_next_row()?;
        row.set_row(&handle);
        writeln!(out, "{}\t", row.format_row()?)?;
        count += 1;
    }
    reader.close()?;
    Ok(count)
}

/// One managed call per row.
pub fn bench_row(
    rt: &Runtime,
    path: &str,
    print_every: usize,
    opts: &BackendOptions,
    out: &mut dyn Write,
) -> Result<BenchSummary> {
    writeln!(out, "\nTest next Row Performance:")?;
    let print_every = print_every.max(1);
    let start = Instant::now();
    let mut reader = ReaderBuilder::new(rt, path)?.with_backend_options(opts)?.build()?;
    let build = start.elapsed();
    writeln!(out, "\n\nbuild time is: {:.6} s\n", build.as_secs_f64())?;

    let mut row = RowAccessor::new(rt);
    let mut i = 0usize;
    let read_start = Instant::now();
    let mut window = Instant::now();
    while reader.has_next()? {
        let handle = reader.read_next_row()?;
        i += 1;
        if i > 1 && i % print_every == 0 {
            let elapsed = window.elapsed();
            row.set_row(&handle);
            writeln!(
                out,
                "{}: time is {:.6} s, speed is {:.6} records/s  {}",
                i,
                elapsed.as_secs_f64(),
                rate(print_every, elapsed),
                preview(&row, 6)?
            )?;
            window = Instant::now();
        }
    }
    let summary = BenchSummary {
        total: i,
        build,
        read: read_start.elapsed(),
    };
    summary_line(out, &summary)?;
    reader.close()?;
    info!(rows = i, "row benchmark finished");
    Ok(summary)
}

/// `batch` rows per managed call.
pub fn bench_batch(
    rt: &Runtime,
    path: &str,
    batch: usize,
    print_every: usize,
    opts: &BackendOptions,
    out: &mut dyn Write,
) -> Result<BenchSummary> {
    writeln!(out, "\n\nTest next Batch Row Performance:")?;
    let print_every = print_every.max(1);
    let start = Instant::now();
    let mut reader = ReaderBuilder::new(rt, path)?
        .with_backend_options(opts)?
        .with_batch(batch)?
        .build()?;
    let build = start.elapsed();
    writeln!(out, "\n\nbuild time is: {:.6} s\n", build.as_secs_f64())?;

    let mut row = RowAccessor::new(rt);
    let mut i = 0usize;
    let read_start = Instant::now();
    let mut window = Instant::now();
    while reader.has_next()? {
        let fetch = Instant::now();
        let rows = reader.read_next_batch_row(batch)?;
        let fetched = Instant::now();
        for handle in &rows {
            i += 1;
            if i > 1 && i % print_every == 0 {
                row.set_row(handle);
                let elapsed = window.elapsed();
                writeln!(
                    out,
                    "{}: time is {:.6} s, speed is {:.6} records/s, hasNext time is {:.6} s,readNextBatchRow time is {:.6} s {}",
                    i,
                    elapsed.as_secs_f64(),
                    rate(print_every, elapsed),
                    fetch.duration_since(window).as_secs_f64(),
                    fetched.duration_since(fetch).as_secs_f64(),
                    preview(&row, 6)?
                )?;
                window = Instant::now();
            }
        }
    }
    let summary = BenchSummary {
        total: i,
        build,
        read: read_start.elapsed(),
    };
    summary_line(out, &summary)?;
    reader.close()?;
    info!(rows = i, batch, "batch benchmark finished");
    Ok(summary)
}

/// Build over a path that does not exist, report the typed error and carry
/// on. Returns the error that was handled.
pub fn try_catch(rt: &Runtime, out: &mut dyn Write) -> Result<Option<Error>> {
    writeln!(out, "\ntry catch exception and print:")?;
    let handled = match ReaderBuilder::new(rt, MISSING_PATH)?.build() {
        Ok(mut reader) => {
            warn!(path = MISSING_PATH, "expected build to fail");
            reader.close()?;
            None
        }
        Err(e) => {
            writeln!(out, "{}", e)?;
            Some(e)
        }
    };
    writeln!(out, "\nfinished handle exception")?;
    Ok(handled)
}

/// Columns and writer details of a table.
pub fn show_schema(rt: &Runtime, path: &str, out: &mut dyn Write) -> Result<Schema> {
    let reader = SchemaReader::new(rt);
    let schema = reader.read_schema_in_data_file(path)?;
    for (i, field) in schema.fields.iter().enumerate() {
        writeln!(out, "{}\t{}\t{}", i, field.name, field.schema_type())?;
    }
    match reader.version_details(path) {
        Ok(details) => writeln!(out, "{}", details)?,
        Err(e) => warn!(error = %e, "no version details"),
    }
    Ok(schema)
}

/// Load a headed CSV file into a new table and count it back.
///
/// Without `schema_json` every column is a STRING named after its header.
pub fn write_csv(
    rt: &Runtime,
    input: &Path,
    output: &str,
    schema_json: Option<&str>,
    opts: &BackendOptions,
    out: &mut dyn Write,
) -> Result<usize> {
    let mut csv_reader = csv::Reader::from_path(input)?;
    let headers = csv_reader.headers()?.clone();
    let schema = match schema_json {
        Some(json) => Schema::parse_json_schema(json)?,
        None => Schema::new(headers.iter().map(|h| Field::new(h, DataType::String)).collect()),
    };
    if schema.len() != headers.len() {
        return Err(CliError::Carbon(Error::Schema(format!(
            "schema has {} columns, {} has {}",
            schema.len(),
            input.display(),
            headers.len()
        ))));
    }

    let mut writer = WriterBuilder::new(rt)?
        .output_path(output)?
        .with_schema(&schema)?
        .with_backend_options(opts)?
        .written_by("carbonr-cli")?
        .build()?;
    for record in csv_reader.records() {
        let record = record?;
        let cells: Vec<&str> = record.iter().collect();
        writer.write(&cells)?;
    }
    writer.close()?;
    let written = writer.rows_written();

    let mut reader = ReaderBuilder::new(rt, output)?.with_backend_options(opts)?.build()?;
    let mut read_back = 0;
    for row in reader.rows() {
        row?;
        read_back += 1;
    }
    reader.close()?;
    writeln!(out, "wrote {} rows to {}, read back {}", written, output, read_back)?;
    Ok(read_back)
}
