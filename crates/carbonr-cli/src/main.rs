//! carbonr CLI: demos and benchmarks over the CarbonData bindings.

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use carbonr_cli::config::Result;
use carbonr_cli::fixture::{BENCH_PATH, DEMO_PATH, S3_PATH};
use carbonr_cli::{open_runtime, scenarios, BackendKind, CliError, Overrides, SessionConfig};

#[derive(Parser)]
#[command(name = "carbonr")]
#[command(about = "Read, write and benchmark CarbonData tables from native code", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend to run against (overrides the session file)
    #[arg(long, value_enum, global = true)]
    backend: Option<BackendKind>,

    /// YAML session file with `runtime` and `backend` sections
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Classpath entry for the JVM backend; repeatable
    #[arg(long, global = true)]
    classpath: Vec<String>,

    /// Backend option as key=value; repeatable
    #[arg(short = 'D', long = "conf", global = true)]
    conf: Vec<String>,

    /// Debug logging and -verbose:jni
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Rows in the seeded benchmark table (memory backend)
    #[arg(long, global = true, default_value_t = 200_000)]
    bench_rows: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Read every column of a local table
    ReadLocal {
        #[arg(default_value = DEMO_PATH)]
        path: String,
    },

    /// Read a local table through a projection
    ReadProjection {
        #[arg(default_value = DEMO_PATH)]
        path: String,

        #[arg(long, default_value = "test")]
        table: String,

        /// Comma-separated columns; defaults to all twelve demo columns
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,
    },

    /// Read a remote table with explicit credentials
    ReadS3 {
        access_key: String,
        secret_key: String,
        endpoint: String,

        #[arg(long, default_value = S3_PATH)]
        path: String,
    },

    /// Row-at-a-time throughput
    BenchRow {
        #[arg(default_value = BENCH_PATH)]
        path: String,

        #[arg(long, default_value_t = 100_000)]
        print_every: usize,
    },

    /// Batched throughput
    BenchBatch {
        #[arg(default_value = BENCH_PATH)]
        path: String,

        #[arg(long, default_value_t = 100_000)]
        batch: usize,

        #[arg(long, default_value_t = 100_000)]
        print_every: usize,
    },

    /// Write a headed CSV file into a table
    Write {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: String,

        /// JSON schema, e.g. [{name:string},{age:int}]
        #[arg(long)]
        schema: Option<String>,
    },

    /// Print the schema of a table or data file
    Schema {
        #[arg(default_value = DEMO_PATH)]
        path: String,
    },

    /// Build over a missing path and handle the error
    TryCatch,

    /// try-catch, both local reads, schema and both benchmarks
    Demo,
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        for hint in e.suggestions() {
            eprintln!("  hint: {}", hint);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut session = SessionConfig::resolve(cli.config.as_deref())?;
    session.apply(&Overrides {
        backend_kind: cli.backend,
        classpath: cli.classpath.clone(),
        verbose_jni: cli.verbose && cli.backend == Some(BackendKind::Jvm),
        options: cli.conf.clone(),
    })?;

    let rt = open_runtime(&session, cli.bench_rows)?;
    let opts = &session.backend;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::ReadLocal { path } => {
            scenarios::read_local(&rt, &path, opts, &mut out)?;
        }
        Commands::ReadProjection { path, table, columns } => {
            scenarios::read_projection(&rt, &path, &table, &columns, opts, &mut out)?;
        }
        Commands::ReadS3 {
            access_key,
            secret_key,
            endpoint,
            path,
        } => {
            scenarios::read_s3(&rt, &path, &access_key, &secret_key, &endpoint, opts, &mut out)?;
        }
        Commands::BenchRow { path, print_every } => {
            scenarios::bench_row(&rt, &path, print_every, opts, &mut out)?;
        }
        Commands::BenchBatch {
            path,
            batch,
            print_every,
        } => {
            scenarios::bench_batch(&rt, &path, batch, print_every, opts, &mut out)?;
        }
        Commands::Write { input, output, schema } => {
            scenarios::write_csv(&rt, &input, &output, schema.as_deref(), opts, &mut out)?;
        }
        Commands::Schema { path } => {
            scenarios::show_schema(&rt, &path, &mut out)?;
        }
        Commands::TryCatch => {
            scenarios::try_catch(&rt, &mut out)?;
        }
        Commands::Demo => {
            scenarios::try_catch(&rt, &mut out)?;
            scenarios::read_local(&rt, DEMO_PATH, opts, &mut out)?;
            scenarios::read_projection(&rt, DEMO_PATH, "test", &[], opts, &mut out)?;
            scenarios::show_schema(&rt, DEMO_PATH, &mut out)?;
            scenarios::bench_row(&rt, BENCH_PATH, 100_000, opts, &mut out)?;
            scenarios::bench_batch(&rt, BENCH_PATH, 100_000, 100_000, opts, &mut out)?;
        }
    }

    out.flush()?;
    drop(out);
    rt.shutdown().map_err(CliError::from)?;
    println!("\nfinish destroy runtime");
    Ok(())
}
