//! CLI error types.

use std::path::PathBuf;

use scribe_config::ConfigError;
use scribe_rtf::ConvertError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Convert(#[from] ConvertError),

    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(
        "{} and {} would both be written to {}",
        first.display(),
        second.display(),
        destination.display()
    )]
    OutputCollision {
        first: PathBuf,
        second: PathBuf,
        destination: PathBuf,
    },

    #[error("{failed} of {total} files failed to convert")]
    Batch { failed: usize, total: usize },
}
