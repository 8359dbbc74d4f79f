//! Registry CLI entry point.

use clap::Parser;
use registry::cli::commands;
use registry::cli::{Cli, Commands};
use registry::config::RegistryConfig;
use registry::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,rusqlite=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn config(cli: &Cli) -> Result<RegistryConfig, Error> {
    RegistryConfig::resolve(
        cli.db.as_deref(),
        cli.table.as_deref(),
        cli.cache.as_deref(),
        cli.cache_dir.as_deref(),
    )
}

fn run(cli: &Cli) -> Result<(), Error> {
    let json = cli.json;
    match &cli.command {
        Commands::Init { force } => commands::init::execute(&config(cli)?, *force, json),
        Commands::Completions { shell, output } => {
            commands::completions::execute(*shell, output.as_deref())
        }

        // Entries
        Commands::Get(args) => commands::entry::execute_get(args, &config(cli)?, json),
        Commands::Set(args) => commands::entry::execute_set(args, &config(cli)?, json),
        Commands::Overwrite(args) => commands::entry::execute_overwrite(args, &config(cli)?, json),
        Commands::Store { values } => commands::entry::execute_store(values, &config(cli)?, json),
        Commands::Forget { key } => commands::entry::execute_forget(key, &config(cli)?, json),
        Commands::Dump(args) => commands::entry::execute_dump(args, &config(cli)?, json),
        Commands::All => commands::entry::execute_all(&config(cli)?, json),

        // Maintenance
        Commands::Clear => commands::maintenance::execute_clear(&config(cli)?, json),
        Commands::Flush => commands::maintenance::execute_flush(&config(cli)?, json),
        Commands::Migrate { rollback } => {
            commands::maintenance::execute_migrate(*rollback, &config(cli)?, json)
        }
    }
}
