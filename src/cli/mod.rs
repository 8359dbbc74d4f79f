//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

pub mod commands;

/// Dotted-key registry backed by SQLite
#[derive(Parser, Debug)]
#[command(name = "reg", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.registry/data/registry.db)
    #[arg(long, global = true, env = "REGISTRY_DB")]
    pub db: Option<PathBuf>,

    /// Registry table name (default: registry)
    #[arg(long, global = true, env = "REGISTRY_TABLE")]
    pub table: Option<String>,

    /// Cache name the registry mirror is stored under (default: the table name)
    #[arg(long, global = true, env = "REGISTRY_CACHE")]
    pub cache: Option<String>,

    /// Cache directory (default: ~/.registry/cache)
    #[arg(long, global = true, env = "REGISTRY_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the registry database and table
    Init {
        /// Delete and recreate an existing database
        #[arg(long)]
        force: bool,
    },

    /// Get the value at a dotted key
    Get(ReadArgs),

    /// Create or update the value at a dotted key
    Set(WriteArgs),

    /// Update the value at a dotted key of an existing entry
    Overwrite(WriteArgs),

    /// Upsert whole entries from a JSON object (inline or @file)
    Store {
        /// JSON object of root keys to values, or @path to a JSON file
        values: String,
    },

    /// Remove the value at a dotted key (a root key removes the entry)
    Forget {
        /// Dotted key to remove
        key: String,
    },

    /// Print the whole entry for the root of a dotted key
    Dump(ReadArgs),

    /// Print every entry
    All,

    /// Invalidate the cache and rebuild it from the database
    Clear,

    /// Delete every entry and invalidate the cache
    Flush,

    /// Apply pending table migrations, or revert them
    Migrate {
        /// Revert all migrations (drops the registry table)
        #[arg(long)]
        rollback: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Dotted key, e.g. app.feature.enabled
    pub key: String,

    /// Value returned when nothing is stored (JSON or plain string)
    #[arg(short, long)]
    pub default: Option<String>,
}

#[derive(Args, Debug)]
pub struct WriteArgs {
    /// Dotted key, e.g. app.feature.enabled
    pub key: String,

    /// Value to write (JSON, or a plain string)
    pub value: String,
}
