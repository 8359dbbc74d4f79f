//! Shell completion scripts for `reg`.

use crate::cli::Cli;
use crate::error::Result;
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Write the completion script for `shell` to `output`, or stdout.
///
/// # Errors
///
/// Returns an error if the output file cannot be created or written.
pub fn execute(shell: Shell, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let mut file = File::create(path)?;
            write_script(shell, &mut file)?;
            eprintln!("Wrote {shell} completions to {}", path.display());
        }
        None => write_script(shell, &mut io::stdout().lock())?,
    }
    Ok(())
}

fn write_script(shell: Shell, out: &mut dyn Write) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "reg", out);
    out.flush()?;
    Ok(())
}
