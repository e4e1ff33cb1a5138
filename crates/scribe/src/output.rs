//! Conversion progress reporting on stderr.
//!
//! Documents written with `--stdout` own standard output, so every report
//! goes to stderr.

use std::fmt::Display;
use std::path::Path;

use console::{Style, Term};

/// Reporter for conversion results.
pub(crate) struct Output {
    term: Term,
    done: Style,
    skipped: Style,
    failed: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            done: Style::new().green(),
            skipped: Style::new().yellow(),
            failed: Style::new().red(),
        }
    }

    /// Single document written by `convert`.
    pub(crate) fn wrote(&self, destination: &Path) {
        self.line(&self.done, &format!("Wrote {}", destination.display()));
    }

    /// Batch run about to start.
    pub(crate) fn batch_started(&self, count: usize, dir: &Path) {
        let _ = self.term.write_line(&format!(
            "Converting {} from {}",
            files(count),
            dir.display()
        ));
    }

    /// Directory holding nothing to convert.
    pub(crate) fn no_inputs(&self, extensions: &[String], dir: &Path) {
        self.line(
            &self.skipped,
            &format!(
                "No files with extensions [{}] in {}",
                extensions.join(", "),
                dir.display()
            ),
        );
    }

    /// One batch input converted.
    pub(crate) fn converted(&self, input: &Path, destination: &Path) {
        self.line(
            &self.done,
            &format!("{} -> {}", input.display(), destination.display()),
        );
    }

    /// One batch input that could not be converted.
    pub(crate) fn input_failed(&self, input: &Path, err: &dyn Display) {
        self.line(&self.failed, &format!("{}: {err}", input.display()));
    }

    /// Every batch input converted.
    pub(crate) fn batch_finished(&self, count: usize) {
        self.line(&self.done, &format!("Converted {}", files(count)));
    }

    /// Fatal error ending the command.
    pub(crate) fn fatal(&self, err: &dyn Display) {
        self.line(&self.failed, &format!("Error: {err}"));
    }

    fn line(&self, style: &Style, msg: &str) {
        let _ = self.term.write_line(&style.apply_to(msg).to_string());
    }
}

/// `1 file`, `3 files`.
fn files(count: usize) -> String {
    if count == 1 {
        "1 file".to_owned()
    } else {
        format!("{count} files")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_file_count_wording() {
        assert_eq!(files(0), "0 files");
        assert_eq!(files(1), "1 file");
        assert_eq!(files(12), "12 files");
    }
}
