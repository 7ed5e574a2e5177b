use anyhow::{anyhow, bail, Result};
use capscrub::{
    scrub::{flatten_newlines, ScrubConfig},
    table::io::{read_table, resolve_encoding, write_table},
};
use clap::Parser;
use std::{path::PathBuf, process::ExitCode};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const EXIT_READ: u8 = 1;
const EXIT_USAGE: u8 = 2;
const EXIT_WRITE: u8 = 3;

#[derive(Parser)]
#[command(name = "capscrub")]
#[command(
    about = "Remove whole sentences containing whole-word matches of the target terms \
             from a CSV column, and export with one record per line"
)]
struct Args {
    /// Input CSV path
    #[arg(short, long)]
    input: PathBuf,

    /// Output CSV path
    #[arg(short, long)]
    output: PathBuf,

    /// Column name to process
    #[arg(short, long, default_value = "caption")]
    column: String,

    /// Whole-word target term; repeat the flag for more than one
    #[arg(
        long = "term",
        value_name = "TERM",
        default_values_t = [
            "lighting".to_string(),
            "illumination".to_string(),
            "light".to_string(),
        ]
    )]
    terms: Vec<String>,

    /// Keep the original column as <column>_orig, and overwrite the original
    /// column with the cleaned result
    #[arg(long)]
    keep_original: bool,

    /// Drop rows where the target column becomes empty after cleaning
    #[arg(long)]
    drop_empty: bool,

    /// Text encoding for both read and write
    #[arg(long, default_value = "utf-8")]
    encoding: String,

    /// Field delimiter for both read and write
    #[arg(long, default_value = ",")]
    sep: String,

    /// By default newlines are replaced with spaces in ALL columns before
    /// export; set this flag to disable that for non-target columns
    #[arg(long)]
    no_flatten_all: bool,
}

/// Pipeline failure tagged with the exit code of the stage it belongs to.
struct FatalError {
    code: u8,
    err: anyhow::Error,
}

fn fatal(code: u8) -> impl Fn(anyhow::Error) -> FatalError {
    move |err| FatalError { code, err }
}

fn parse_delimiter(sep: &str) -> Result<u8> {
    match sep.as_bytes() {
        [b] => Ok(*b),
        _ => bail!("delimiter must be a single byte, got {sep:?}"),
    }
}

fn run(args: &Args) -> Result<(), FatalError> {
    // process-scoped configuration, built before any file is touched
    let encoding = resolve_encoding(&args.encoding).map_err(fatal(EXIT_USAGE))?;
    let delimiter = parse_delimiter(&args.sep).map_err(fatal(EXIT_USAGE))?;
    let config = ScrubConfig::new(&args.terms).map_err(fatal(EXIT_USAGE))?;

    let mut table = read_table(&args.input, delimiter, encoding).map_err(fatal(EXIT_READ))?;
    info!(
        rows = table.rows.len(),
        columns = table.headers.len(),
        "loaded {}",
        args.input.display()
    );

    let target = table.column_index(&args.column).ok_or_else(|| FatalError {
        code: EXIT_USAGE,
        err: anyhow!(
            "column not found: {}; available columns: {:?}",
            args.column,
            table.headers
        ),
    })?;

    if args.keep_original {
        let backup = format!("{}_orig", args.column);
        if table.column_index(&backup).is_some() {
            warn!("backup column {backup} already exists and will be overwritten");
        }
        table.duplicate_column(target, &backup);
    }

    table.apply_to_column(target, |cell| config.scrub(cell));

    if args.drop_empty {
        let removed = table.retain_rows(|row| !row[target].trim().is_empty());
        info!("removed {removed} rows with empty {}", args.column);
    }

    if !args.no_flatten_all {
        table.apply_to_all(flatten_newlines);
    }

    write_table(&args.output, delimiter, encoding, &table).map_err(fatal(EXIT_WRITE))?;
    Ok(())
}

fn main() -> ExitCode {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => {
            println!("wrote {}", args.output.display());
            ExitCode::SUCCESS
        }
        Err(FatalError { code, err }) => {
            error!("{err:#}");
            ExitCode::from(code)
        }
    }
}
