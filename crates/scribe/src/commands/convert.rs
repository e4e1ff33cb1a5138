//! `scribe convert` command implementation.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::Args;
use scribe_config::Config;

use super::{cli_settings, write_document};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Markdown file to convert, or `-` to read standard input.
    input: PathBuf,

    /// Output file (default: input name with the configured extension).
    #[arg(short, long, conflicts_with = "stdout")]
    output: Option<PathBuf>,

    /// Write the document to standard output.
    #[arg(long)]
    stdout: bool,

    /// Escape non-ASCII characters as RTF Unicode escapes (overrides config).
    #[arg(long)]
    escape_non_ascii: bool,

    /// Disable tables, strikethrough and task lists (overrides config).
    #[arg(long)]
    no_gfm: bool,

    /// Path to configuration file (default: auto-discover scribe.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl ConvertArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let settings = cli_settings(None, self.escape_non_ascii, self.no_gfm);
        let config = Config::load(self.config.as_deref(), Some(&settings))?;

        let from_stdin = self.input.as_os_str() == "-";
        let markdown = if from_stdin {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        } else {
            fs::read_to_string(&self.input).map_err(|source| CliError::File {
                path: self.input.clone(),
                source,
            })?
        };

        let rtf = config.converter().convert(&markdown)?;

        if self.stdout || (from_stdin && self.output.is_none()) {
            let mut stdout = io::stdout().lock();
            stdout.write_all(rtf.as_bytes())?;
            stdout.flush()?;
            return Ok(());
        }

        let destination = self
            .output
            .unwrap_or_else(|| config.output_path_for(&self.input));
        write_document(&destination, &rtf)?;

        tracing::info!(bytes = rtf.len(), "Converted document");
        output.wrote(&destination);
        Ok(())
    }
}
