//! `scribe batch` command implementation.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use rayon::prelude::*;
use scribe_config::{Config, InputConfig};

use super::{cli_settings, convert_file};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the batch command.
#[derive(Args)]
pub(crate) struct BatchArgs {
    /// Directory containing markdown files (not searched recursively).
    dir: PathBuf,

    /// Output directory (default: config value, or next to each input).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

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

impl BatchArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let settings = cli_settings(self.output_dir, self.escape_non_ascii, self.no_gfm);
        let config = Config::load(self.config.as_deref(), Some(&settings))?;

        let inputs = collect_inputs(&self.dir, &config.input)?;
        if inputs.is_empty() {
            output.no_inputs(&config.input.extensions, &self.dir);
            return Ok(());
        }
        let jobs = plan_outputs(&config, &inputs)?;
        output.batch_started(jobs.len(), &self.dir);

        let converter = config.converter();
        let results: Vec<(&PathBuf, Result<&PathBuf, CliError>)> = jobs
            .par_iter()
            .map(|(input, destination)| {
                let result = convert_file(&converter, input, destination).map(|()| destination);
                (input, result)
            })
            .collect();

        let mut failed = 0;
        for (input, result) in &results {
            match result {
                Ok(destination) => output.converted(input, destination),
                Err(err) => {
                    failed += 1;
                    output.input_failed(input, err);
                }
            }
        }

        if failed > 0 {
            return Err(CliError::Batch {
                failed,
                total: results.len(),
            });
        }
        output.batch_finished(results.len());
        Ok(())
    }
}

/// Files directly inside `dir` with an accepted extension, sorted by path.
fn collect_inputs(dir: &Path, input: &InputConfig) -> Result<Vec<PathBuf>, CliError> {
    let entries = fs::read_dir(dir).map_err(|source| CliError::File {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut inputs = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && input.accepts(&path) {
            inputs.push(path);
        }
    }
    inputs.sort();
    Ok(inputs)
}

/// Pair each input with its destination.
///
/// Inputs differing only in extension (`post.md`, `post.txt`) map to the
/// same document, so such a batch is rejected before anything is written.
fn plan_outputs(
    config: &Config,
    inputs: &[PathBuf],
) -> Result<Vec<(PathBuf, PathBuf)>, CliError> {
    let mut claimed: HashMap<PathBuf, &PathBuf> = HashMap::with_capacity(inputs.len());
    let mut jobs = Vec::with_capacity(inputs.len());
    for input in inputs {
        let destination = config.output_path_for(input);
        if let Some(first) = claimed.insert(destination.clone(), input) {
            return Err(CliError::OutputCollision {
                first: first.clone(),
                second: input.clone(),
                destination,
            });
        }
        jobs.push((input.clone(), destination));
    }
    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(dir: &Path, config: &Path) -> BatchArgs {
        BatchArgs {
            dir: dir.to_path_buf(),
            output_dir: None,
            escape_non_ascii: false,
            no_gfm: false,
            config: Some(config.to_path_buf()),
            verbose: false,
        }
    }

    #[test]
    fn test_collect_inputs_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.md"), "").unwrap();
        fs::write(dir.path().join("a.markdown"), "").unwrap();
        fs::write(dir.path().join("notes.rtf"), "").unwrap();
        fs::create_dir(dir.path().join("sub.md")).unwrap();
        fs::write(dir.path().join("sub.md/c.md"), "").unwrap();

        let inputs = collect_inputs(dir.path(), &InputConfig::default()).unwrap();

        assert_eq!(
            inputs,
            vec![dir.path().join("a.markdown"), dir.path().join("b.md")]
        );
    }

    #[test]
    fn test_collect_inputs_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = collect_inputs(&dir.path().join("missing"), &InputConfig::default())
            .unwrap_err();
        assert!(matches!(err, CliError::File { .. }));
    }

    #[test]
    fn test_batch_converts_into_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("scribe.toml");
        fs::write(&config, "").unwrap();
        let posts = dir.path().join("posts");
        fs::create_dir(&posts).unwrap();
        fs::write(posts.join("one.md"), "# One").unwrap();
        fs::write(posts.join("two.txt"), "- a\n- b").unwrap();

        let mut batch = args(&posts, &config);
        batch.output_dir = Some(dir.path().join("out"));
        batch.execute().unwrap();

        let one = fs::read_to_string(dir.path().join("out/one.rtf")).unwrap();
        let two = fs::read_to_string(dir.path().join("out/two.rtf")).unwrap();
        assert!(one.contains(r"\fs36\b One"));
        assert!(two.contains(r"{\bullet} a"));
    }

    #[test]
    fn test_plan_outputs_rejects_shared_destination() {
        let config = Config::default();
        let inputs = vec![PathBuf::from("posts/post.md"), PathBuf::from("posts/post.txt")];

        let err = plan_outputs(&config, &inputs).unwrap_err();

        match err {
            CliError::OutputCollision {
                first,
                second,
                destination,
            } => {
                assert_eq!(first, PathBuf::from("posts/post.md"));
                assert_eq!(second, PathBuf::from("posts/post.txt"));
                assert_eq!(destination, PathBuf::from("posts/post.rtf"));
            }
            other => panic!("expected output collision, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_outputs_distinct_stems() {
        let config = Config::default();
        let inputs = vec![PathBuf::from("a.md"), PathBuf::from("b.txt")];

        let jobs = plan_outputs(&config, &inputs).unwrap();

        assert_eq!(
            jobs,
            vec![
                (PathBuf::from("a.md"), PathBuf::from("a.rtf")),
                (PathBuf::from("b.txt"), PathBuf::from("b.rtf")),
            ]
        );
    }

    #[test]
    fn test_batch_same_stem_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("scribe.toml");
        fs::write(&config, "").unwrap();
        let posts = dir.path().join("posts");
        fs::create_dir(&posts).unwrap();
        fs::write(posts.join("post.md"), "FROM_MD").unwrap();
        fs::write(posts.join("post.txt"), "FROM_TXT").unwrap();

        let err = args(&posts, &config).execute().unwrap_err();

        assert!(matches!(err, CliError::OutputCollision { .. }));
        assert!(err.to_string().contains("post.rtf"));
        assert!(!posts.join("post.rtf").exists());
    }

    #[test]
    fn test_batch_empty_dir_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("scribe.toml");
        fs::write(&config, "").unwrap();
        let empty = dir.path().join("empty");
        fs::create_dir(&empty).unwrap();

        args(&empty, &config).execute().unwrap();
    }

    #[test]
    fn test_batch_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("scribe.toml");
        fs::write(&config, "").unwrap();
        let posts = dir.path().join("posts");
        fs::create_dir(&posts).unwrap();
        fs::write(posts.join("good.md"), "fine").unwrap();
        fs::write(posts.join("bad.md"), [0xff, 0xfe, 0x00]).unwrap();

        let err = args(&posts, &config).execute().unwrap_err();

        assert!(matches!(err, CliError::Batch { failed: 1, total: 2 }));
        assert!(posts.join("good.rtf").exists());
        assert!(!posts.join("bad.rtf").exists());
    }
}
