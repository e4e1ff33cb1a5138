//! CLI command implementations.

pub(crate) mod batch;
pub(crate) mod convert;

pub(crate) use batch::BatchArgs;
pub(crate) use convert::ConvertArgs;

use std::fs;
use std::path::{Path, PathBuf};

use scribe_config::CliSettings;
use scribe_rtf::{NonAsciiPolicy, RtfConverter};

use crate::error::CliError;

/// Build config overrides from the flags shared by all commands.
fn cli_settings(output_dir: Option<PathBuf>, escape_non_ascii: bool, no_gfm: bool) -> CliSettings {
    CliSettings {
        output_dir,
        non_ascii: escape_non_ascii.then_some(NonAsciiPolicy::Escape),
        gfm: no_gfm.then_some(false),
    }
}

/// Read a markdown file, convert it, and write the document to `destination`.
fn convert_file(
    converter: &RtfConverter,
    input: &Path,
    destination: &Path,
) -> Result<(), CliError> {
    let markdown = fs::read_to_string(input).map_err(|source| CliError::File {
        path: input.to_path_buf(),
        source,
    })?;
    let rtf = converter.convert(&markdown)?;
    write_document(destination, &rtf)?;

    tracing::info!(
        input = %input.display(),
        output = %destination.display(),
        bytes = rtf.len(),
        "Converted file"
    );
    Ok(())
}

/// Write a document, creating missing parent directories.
fn write_document(destination: &Path, rtf: &str) -> Result<(), CliError> {
    let to_file_error = |source| CliError::File {
        path: destination.to_path_buf(),
        source,
    };
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_file_error)?;
    }
    fs::write(destination, rtf).map_err(to_file_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_settings_flags() {
        let settings = cli_settings(Some(PathBuf::from("out")), true, true);
        assert_eq!(settings.output_dir, Some(PathBuf::from("out")));
        assert_eq!(settings.non_ascii, Some(NonAsciiPolicy::Escape));
        assert_eq!(settings.gfm, Some(false));
    }

    #[test]
    fn test_cli_settings_defaults_do_not_override() {
        let settings = cli_settings(None, false, false);
        assert_eq!(settings.output_dir, None);
        assert_eq!(settings.non_ascii, None);
        assert_eq!(settings.gfm, None);
    }

    #[test]
    fn test_convert_file_writes_document() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("post.md");
        let destination = dir.path().join("nested/out/post.rtf");
        fs::write(&input, "# Title\nBody text").unwrap();

        convert_file(&RtfConverter::new(), &input, &destination).unwrap();

        let rtf = fs::read_to_string(&destination).unwrap();
        assert!(rtf.starts_with(r"{\rtf1"));
        assert!(rtf.contains("Body text"));
        assert!(rtf.ends_with('}'));
    }

    #[test]
    fn test_convert_file_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("missing.md");

        let err = convert_file(&RtfConverter::new(), &input, &dir.path().join("x.rtf"))
            .unwrap_err();
        assert!(matches!(err, CliError::File { .. }));
        assert!(err.to_string().contains("missing.md"));
    }
}
