//! Limpet: a durable local cache for CLI tooling.
//!
//! Limpet persists key/value entries on disk between invocations so tools
//! can memoize expensive results. Entries may carry a time-to-live; expired
//! entries read as absent, never as errors. The cache lives under
//! `<home>/<application>/<database>/` and is held exclusively by one process
//! at a time.
//!
//! # Crate Structure
//!
//! - [`core::store`]: the embedded key-value engine and its lifecycle
//! - [`core::db`], [`core::paths`], [`core::time`]: engine plumbing
//! - This module: the clap CLI and the bootstrap/shutdown sequence

pub mod core;

use crate::core::error::LimpetError;
use crate::core::store::Store;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(
    name = "limpet",
    version = env!("CARGO_PKG_VERSION"),
    about = "Durable local cache with per-entry expiration"
)]
struct Cli {
    /// Application name; first segment of the cache location under the home
    /// directory.
    #[clap(long, global = true, default_value = "limpet")]
    app: String,
    /// Database name; second segment of the cache location.
    #[clap(long, global = true, default_value = "cache")]
    db: String,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store a value under a key
    Set {
        key: String,
        value: String,
        /// Time-to-live in seconds; 0 means the entry never expires.
        #[clap(long, default_value_t = 0)]
        ttl: u64,
    },
    /// Print the value for a key (empty when absent or expired)
    Get {
        key: String,
        /// Output format: 'text' or 'json'.
        #[clap(long, default_value = "text")]
        format: String,
    },
    /// Erase every entry in the cache
    Flush,
    /// Reclaim disk space from expired and superseded entries
    Gc,
    /// Show the cache location and connection state
    Info {
        /// Output format: 'text' or 'json'.
        #[clap(long, default_value = "text")]
        format: String,
    },
}

pub fn run() -> Result<(), LimpetError> {
    let cli = Cli::parse();
    let mut store = Store::connect(&cli.app, &cli.db)?;
    let result = dispatch(&store, &cli.command);
    shutdown(&mut store);
    result
}

fn dispatch(store: &Store, command: &Command) -> Result<(), LimpetError> {
    match command {
        Command::Set { key, value, ttl } => {
            store.set(key, value, Duration::from_secs(*ttl))?;
            if *ttl > 0 {
                println!(
                    "{} cached {} for {}s",
                    "✓".bright_green(),
                    key.bright_white(),
                    ttl
                );
            } else {
                println!("{} cached {}", "✓".bright_green(), key.bright_white());
            }
        }
        Command::Get { key, format } => {
            let value = store.get(key)?;
            if format == "json" {
                let envelope = serde_json::json!({ "key": key, "value": value });
                println!("{}", serde_json::to_string_pretty(&envelope).unwrap());
            } else {
                println!("{}", value);
            }
        }
        Command::Flush => {
            store.flush()?;
            println!("{} local cache flushed", "✓".bright_green());
        }
        Command::Gc => {
            store.garbage_collection()?;
            println!("{} compaction complete", "✓".bright_green());
        }
        Command::Info { format } => {
            let status = store.status();
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&status).unwrap());
            } else {
                println!("{} {}", "path:".bright_white(), status.path);
                println!("{} {}", "connected:".bright_white(), status.connected);
            }
        }
    }
    Ok(())
}

/// Orderly shutdown: compact, then release the handle. Failures here are
/// warnings; the command's own result decides the exit code.
fn shutdown(store: &mut Store) {
    if !store.is_connected() {
        return;
    }
    if let Err(err) = store.garbage_collection() {
        eprintln!(
            "{} garbage collection failed: {}",
            "⚠".bright_yellow(),
            err
        );
    }
    if let Err(err) = store.disconnect() {
        eprintln!("{} close failed: {}", "⚠".bright_yellow(), err);
    }
}
