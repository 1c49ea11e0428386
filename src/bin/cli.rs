//! PrelDB CLI
//!
//! Command-line interface for inspecting and editing a PrelDB database.

use std::io::Write;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use preldb::{CommitPolicy, Config, Database, OpenFlag};
use tracing_subscriber::{fmt, EnvFilter};

/// PrelDB CLI
#[derive(Parser, Debug)]
#[command(name = "preldb")]
#[command(about = "CLI for the PrelDB key-value store")]
#[command(version)]
struct Args {
    /// Base path of the database (files are <db>.dir, <db>.dat, <db>.bak)
    #[arg(short, long, default_value = "./preldb")]
    db: String,

    /// Permission bits for newly written files, in octal
    #[arg(short, long, default_value = "666", value_parser = parse_octal)]
    mode: u32,

    /// Open flag: 'c' opens or creates, 'n' removes existing files first
    #[arg(short, long, default_value = "c", value_parser = parse_flag)]
    flag: OpenFlag,

    /// Commit the directory once every N mutations
    #[arg(long, default_value = "1")]
    commit_every: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Check whether a key exists
    Contains {
        /// The key to check
        key: String,
    },

    /// List all keys
    Keys,

    /// List all keys with their data file offset and length
    Entries,
}

fn parse_octal(s: &str) -> Result<u32, String> {
    u32::from_str_radix(s.trim_start_matches("0o"), 8).map_err(|e| e.to_string())
}

fn parse_flag(s: &str) -> Result<OpenFlag, String> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => OpenFlag::from_char(c).map_err(|e| e.to_string()),
        _ => Err(format!("expected a single-letter flag, got '{}'", s)),
    }
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let policy = if args.commit_every == 1 {
        CommitPolicy::EveryMutation
    } else {
        CommitPolicy::EveryNMutations {
            count: args.commit_every,
        }
    };

    let config = Config::builder()
        .path(&args.db)
        .flag(args.flag)
        .mode(args.mode)
        .commit_policy(policy)
        .build();

    let db = match Database::open(config) {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let outcome = run(&db, args.command);
    let closed = db.close();

    match (outcome, closed) {
        (Ok(true), Ok(())) => ExitCode::SUCCESS,
        (Ok(false), Ok(())) => ExitCode::FAILURE,
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Execute one command; `Ok(false)` means the key was not there
fn run(db: &Database, command: Commands) -> preldb::Result<bool> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Get { key } => match db.get(&key)? {
            Some(value) => {
                out.write_all(&value)?;
                out.write_all(b"\n")?;
                Ok(true)
            }
            None => {
                eprintln!("(not found)");
                Ok(false)
            }
        },
        Commands::Set { key, value } => {
            db.set(&key, value)?;
            Ok(true)
        }
        Commands::Del { key } => {
            let removed = db.delete(&key)?;
            if !removed {
                eprintln!("(not found)");
            }
            Ok(removed)
        }
        Commands::Contains { key } => {
            writeln!(out, "{}", db.contains(&key)?)?;
            Ok(true)
        }
        Commands::Keys => {
            for key in db.keys()? {
                writeln!(out, "{}", key)?;
            }
            Ok(true)
        }
        Commands::Entries => {
            for (key, location) in db.entries()? {
                writeln!(out, "{} {} {}", key, location.offset, location.length)?;
            }
            Ok(true)
        }
    }
}
