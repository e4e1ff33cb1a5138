//! `${VAR}` and `~` expansion for the `[output]` settings.
//!
//! `${VAR}` must be set; `${VAR:-default}` falls back to `default`. Bare
//! `$VAR` is left alone so literal dollar signs in directory names survive.

use crate::ConfigError;

/// Output settings whose values are expanded after parsing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OutputField {
    /// `output.dir`: variables, then a leading `~`.
    Dir,
    /// `output.extension`: variables only.
    Extension,
}

impl OutputField {
    /// Key as written in `scribe.toml`.
    pub(crate) fn key(self) -> &'static str {
        match self {
            Self::Dir => "output.dir",
            Self::Extension => "output.extension",
        }
    }

    /// Expand `value` as this field.
    pub(crate) fn expand(self, value: &str) -> Result<String, ConfigError> {
        let expanded = if value.contains("${") {
            shellexpand::env_with_context(value, lookup)
                .map_err(|e| ConfigError::EnvVar {
                    field: self.key().to_owned(),
                    message: format!("${{{}}} not set", e.cause.0),
                })?
                .into_owned()
        } else {
            value.to_owned()
        };

        match self {
            Self::Dir => Ok(shellexpand::tilde(&expanded).into_owned()),
            Self::Extension => Ok(expanded),
        }
    }
}

/// Variable with no value and no default.
struct Unset(String);

fn lookup(var: &str) -> Result<Option<String>, Unset> {
    std::env::var(var).map(Some).map_err(|_| Unset(var.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dir_variable_and_suffix() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("SCRIBE_TEST_ROOT", "/srv");
        }
        let result = OutputField::Dir.expand("${SCRIBE_TEST_ROOT}/posts").unwrap();
        assert_eq!(result, "/srv/posts");
        unsafe {
            std::env::remove_var("SCRIBE_TEST_ROOT");
        }
    }

    #[test]
    fn test_extension_default_used_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("SCRIBE_UNSET_EXT_TEST");
        }
        let result = OutputField::Extension
            .expand("${SCRIBE_UNSET_EXT_TEST:-rtf}")
            .unwrap();
        assert_eq!(result, "rtf");
    }

    #[test]
    fn test_unset_variable_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("SCRIBE_MISSING_VAR_TEST");
        }
        let err = OutputField::Dir
            .expand("${SCRIBE_MISSING_VAR_TEST}/out")
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("SCRIBE_MISSING_VAR_TEST"));
        assert!(err.to_string().contains("output.dir"));
    }

    #[test]
    fn test_bare_dollar_kept() {
        assert_eq!(OutputField::Dir.expand("$drafts/out").unwrap(), "$drafts/out");
    }

    #[test]
    fn test_dir_leading_tilde_expanded() {
        let result = OutputField::Dir.expand("~/posts").unwrap();
        assert!(!result.starts_with('~') || std::env::var_os("HOME").is_none());
        assert!(result.ends_with("/posts"));
    }

    #[test]
    fn test_tilde_only_expanded_for_dir() {
        assert_eq!(OutputField::Dir.expand("a/~b").unwrap(), "a/~b");
        assert_eq!(OutputField::Extension.expand("~rtf").unwrap(), "~rtf");
    }
}
