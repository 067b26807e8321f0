//! rql - inspect and append to rql database logs

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use rql::config::StorageConfig;
use rql::database::Database;
use rql::storage::Value;
use std::path::PathBuf;

/// rql storage engine console
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding one subdirectory per database
    #[arg(short = 'D', long, default_value = "./rql_data")]
    root: PathBuf,

    /// Name of the log file inside each database
    #[arg(short, long, default_value = "rql.log")]
    log_file: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Append one record to a database's log
    Append {
        /// Database name
        db: String,
        /// Field values; anything that parses as an unsigned 32-bit integer
        /// is stored as an int, everything else as a string
        #[arg(required = true)]
        values: Vec<String>,
    },
    /// Print log records, newest first
    Dump {
        /// Database name
        db: String,
        /// Stop after this many records
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show block counts for a database
    Info {
        /// Database name
        db: String,
        /// Additional files to report on
        files: Vec<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = StorageConfig::new(&args.root).with_log_file(&args.log_file);

    match args.command {
        Command::Append { db, values } => {
            let database = open(&config, &db)?;
            let values: Vec<Value> = values.iter().map(|v| parse_value(v)).collect();
            let lsn = database.append(&values).context("Failed to append record")?;
            database.flush_lsn(lsn).context("Failed to flush log")?;
            println!("{}", lsn);
        }
        Command::Dump { db, limit } => {
            let database = open(&config, &db)?;
            let records = database.records().context("Failed to read log")?;
            for record in records.iter().take(limit.unwrap_or(usize::MAX)) {
                println!(
                    "{:>8}  {:>3} bytes  {}",
                    record.address().to_string(),
                    record.len(),
                    hex(record.as_bytes())
                );
            }
        }
        Command::Info { db, files } => {
            let database = open(&config, &db)?;
            let fm = database.file_manager();
            println!("directory: {}", fm.directory().display());
            println!("current:   {}", database.with_log(|log| log.current_lsn()));
            for file in std::iter::once(&config.log_file).chain(files.iter()) {
                let blocks = fm
                    .size(file)
                    .with_context(|| format!("Failed to stat {}", file))?;
                println!("{}: {} blocks", file, blocks);
            }
        }
    }

    Ok(())
}

fn open(config: &StorageConfig, name: &str) -> Result<Database> {
    Database::open(config, name).with_context(|| format!("Failed to open database {}", name))
}

fn parse_value(raw: &str) -> Value {
    raw.parse::<u32>()
        .map(Value::Int)
        .unwrap_or_else(|_| Value::Text(raw.to_string()))
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
