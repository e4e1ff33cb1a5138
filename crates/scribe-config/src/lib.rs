//! Configuration management for Scribe.
//!
//! Parses `scribe.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `output.dir` (also expands a leading `~`)
//! - `output.extension`

mod expand;

use expand::OutputField;
use scribe_rtf::{NonAsciiPolicy, RtfConverter};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override non-ASCII handling.
    pub non_ascii: Option<NonAsciiPolicy>,
    /// Override GFM extensions flag.
    pub gfm: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "scribe.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Conversion options.
    pub rtf: RtfConfig,
    /// Output configuration (paths are strings from TOML).
    output: OutputConfigRaw,
    /// Input file selection.
    pub input: InputConfig,

    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Conversion options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RtfConfig {
    /// Handling of non-ASCII characters outside the substitution table.
    pub non_ascii: NonAsciiPolicy,
    /// Tables, strikethrough, task lists, footnotes and definition lists.
    pub gfm: bool,
}

impl Default for RtfConfig {
    fn default() -> Self {
        Self {
            non_ascii: NonAsciiPolicy::Passthrough,
            gfm: true,
        }
    }
}

/// Raw output configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    dir: Option<String>,
    extension: Option<String>,
}

/// Resolved output configuration.
#[derive(Debug)]
pub struct OutputConfig {
    /// Directory for converted files. `None` writes next to the input.
    pub dir: Option<PathBuf>,
    /// Extension of converted files, without the dot.
    pub extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            extension: "rtf".to_owned(),
        }
    }
}

/// Input file selection for batch conversion.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Extensions of files to convert, without the dot.
    pub extensions: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["md".to_owned(), "markdown".to_owned(), "txt".to_owned()],
        }
    }
}

impl InputConfig {
    /// Whether `path` has one of the configured extensions (case-insensitive).
    #[must_use]
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`output.dir`").
        field: String,
        /// Error message (e.g., "${`POSTS_DIR`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a file extension to be a bare name: no dot, no path separator.
fn require_bare_extension(value: &str, field: &str) -> Result<(), ConfigError> {
    require_non_empty(value, field)?;
    if value.contains(['.', '/', '\\']) {
        return Err(ConfigError::Validation(format!(
            "{field} must be an extension without dots or separators, got \"{value}\""
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `scribe.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(output_dir) = &settings.output_dir {
            self.output_resolved.dir = Some(output_dir.clone());
        }
        if let Some(non_ascii) = settings.non_ascii {
            self.rtf.non_ascii = non_ascii;
        }
        if let Some(gfm) = settings.gfm {
            self.rtf.gfm = gfm;
        }
    }

    /// Converter configured from the `[rtf]` section.
    #[must_use]
    pub fn converter(&self) -> RtfConverter {
        RtfConverter::new()
            .with_non_ascii(self.rtf.non_ascii)
            .with_gfm(self.rtf.gfm)
    }

    /// Destination path for a converted input file.
    ///
    /// The file stem is kept and the extension replaced. Without an output
    /// directory the file lands next to its input.
    #[must_use]
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        let mut name = input
            .file_stem()
            .unwrap_or(input.as_os_str())
            .to_os_string();
        name.push(".");
        name.push(&self.output_resolved.extension);

        let dir = self
            .output_resolved
            .dir
            .as_deref()
            .or_else(|| input.parent())
            .unwrap_or(Path::new("."));
        dir.join(name)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        Self::discover_config_from(&cwd)
    }

    fn discover_config_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_bare_extension(&self.output_resolved.extension, "output.extension")?;

        if self.input.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "input.extensions must list at least one extension".to_owned(),
            ));
        }
        for ext in &self.input.extensions {
            require_bare_extension(ext, "input.extensions")?;
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.output.dir {
            self.output.dir = Some(OutputField::Dir.expand(dir)?);
        }
        if let Some(ref extension) = self.output.extension {
            self.output.extension = Some(OutputField::Extension.expand(extension)?);
        }
        Ok(())
    }

    /// Resolve a relative output directory against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = OutputConfig::default();
        self.output_resolved = OutputConfig {
            dir: self.output.dir.as_deref().map(|dir| config_dir.join(dir)),
            extension: self.output.extension.clone().unwrap_or(defaults.extension),
        };
    }
}
