//! Configuration management for the paper rebuild tool.
//!
//! Parses `paper.toml` configuration files with serde and provides
//! auto-discovery of config files starting at the paper directory and
//! walking up through its parents. Every section is optional; an absent
//! file yields the defaults used by the reference paper layout.
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
//! - `sync.remote`
//! - every `[build]` field

mod expand;

use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the paper directory (defaults to the current directory).
    pub paper_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "paper.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Paper identity (raw, as parsed from TOML).
    paper: PaperConfigRaw,
    /// Remote sync configuration.
    pub sync: SyncConfig,
    /// Markup conversion configuration (paths are relative strings from TOML).
    markup: MarkupConfigRaw,
    /// Build pipeline configuration.
    pub build: BuildConfig,

    /// Resolved paper configuration (set after loading).
    #[serde(skip)]
    pub paper_resolved: PaperConfig,
    /// Resolved markup configuration (set after loading).
    #[serde(skip)]
    pub markup_resolved: MarkupConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw paper configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PaperConfigRaw {
    id: Option<String>,
}

/// Resolved paper identity.
#[derive(Debug, Default)]
pub struct PaperConfig {
    /// Absolute paper directory.
    pub dir: PathBuf,
    /// Paper identifier, used to name the build output directory.
    pub id: String,
}

/// Remote collaborative store configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Name of the git remote pointing at the collaborative store.
    pub remote: String,
    /// Environment variable holding the remote URL, read only when the
    /// remote is not registered yet.
    pub url_env: String,
    /// Branch of the remote that is mirrored.
    pub branch: String,
    /// Paths (relative to the paper directory) mirrored from the remote.
    pub paths: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            remote: "overleaf".to_owned(),
            url_env: "OVERLEAF_CURRENT_REPO".to_owned(),
            branch: "master".to_owned(),
            paths: ["figures", "sections", "references.bib", "main.tex"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

/// Raw markup configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct MarkupConfigRaw {
    sections_dir: Option<String>,
    output_dir: Option<String>,
    figures_file: Option<String>,
    sanitized_figures_name: Option<String>,
}

/// Resolved markup configuration with absolute paths.
#[derive(Debug, Default)]
pub struct MarkupConfig {
    /// Directory holding the `.tex` section sources.
    pub sections_dir: PathBuf,
    /// Directory receiving the converted `.rst` sections.
    pub output_dir: PathBuf,
    /// Figure-definitions file whose labels are sanitized.
    pub figures_file: PathBuf,
    /// File name of the sanitized copy, written next to `figures_file`.
    pub sanitized_figures_name: String,
}

/// Build pipeline configuration.
///
/// Paths are relative to the repository root located at runtime.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Entry whose presence marks the repository root.
    pub vcs_marker: String,
    /// Directory hosting the publishing pipeline; must exist at the root.
    pub publisher_dir: String,
    /// Build script handed to the interpreter.
    pub script: String,
    /// Program running the build script.
    pub interpreter: String,
    /// Directory holding build output, one subdirectory per paper.
    pub output_dir: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            vcs_marker: ".git".to_owned(),
            publisher_dir: "publisher".to_owned(),
            script: "publisher/build_paper.py".to_owned(),
            interpreter: "python3".to_owned(),
            output_dir: "output".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Paper directory does not exist.
    #[error("Paper directory not found: {}", .0.display())]
    PaperDirNotFound(PathBuf),
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
        /// Config field path (e.g., "`build.interpreter`").
        field: String,
        /// Error message (e.g., "${`PYTHON`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a path to stay inside the directory it is resolved against.
fn require_contained(value: &str, field: &str) -> Result<(), ConfigError> {
    let path = Path::new(value);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(ConfigError::Validation(format!(
            "{field} entry '{value}' must be a relative path without '..'"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise,
    /// searches for `paper.toml` in the paper directory and its parents.
    ///
    /// # Errors
    ///
    /// Returns error if the paper directory or an explicit `config_path`
    /// doesn't exist, or if parsing, expansion or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let paper_dir = match cli_settings.and_then(|s| s.paper_dir.as_deref()) {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir()?,
        };
        if !paper_dir.is_dir() {
            return Err(ConfigError::PaperDirNotFound(paper_dir));
        }
        let paper_dir = std::fs::canonicalize(&paper_dir)?;

        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::parse_file(path)?
        } else if let Some(discovered) = Self::discover_config(&paper_dir) {
            Self::parse_file(&discovered)?
        } else {
            Self::default()
        };

        config.resolve_paths(&paper_dir)?;
        config.validate()?;

        Ok(config)
    }

    /// Search for config file in the paper directory and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to given paper directory.
    fn default_with_base(base: &Path) -> Self {
        let mut config = Self {
            paper: PaperConfigRaw::default(),
            sync: SyncConfig::default(),
            markup: MarkupConfigRaw::default(),
            build: BuildConfig::default(),
            paper_resolved: PaperConfig::default(),
            markup_resolved: MarkupConfig::default(),
            config_path: None,
        };
        config.resolve_markup(base);
        config
    }

    /// Parse a configuration file and expand environment variables.
    fn parse_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically by [`Config::load`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.paper_resolved.id, "paper.id")?;
        self.validate_sync()?;
        self.validate_build()?;
        Ok(())
    }

    fn validate_sync(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.sync.remote, "sync.remote")?;
        require_non_empty(&self.sync.url_env, "sync.url_env")?;
        require_non_empty(&self.sync.branch, "sync.branch")?;
        if self.sync.paths.is_empty() {
            return Err(ConfigError::Validation(
                "sync.paths must list at least one path".to_owned(),
            ));
        }
        for path in &self.sync.paths {
            require_non_empty(path, "sync.paths")?;
            require_contained(path, "sync.paths")?;
        }
        Ok(())
    }

    fn validate_build(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.build.vcs_marker, "build.vcs_marker")?;
        require_non_empty(&self.build.publisher_dir, "build.publisher_dir")?;
        require_non_empty(&self.build.script, "build.script")?;
        require_non_empty(&self.build.interpreter, "build.interpreter")?;
        require_non_empty(&self.build.output_dir, "build.output_dir")?;
        require_non_empty(
            &self.markup_resolved.sanitized_figures_name,
            "markup.sanitized_figures_name",
        )?;
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let build = &mut self.build;
        expand::expand_fields(
            [
                ("sync.remote", &mut self.sync.remote),
                ("build.vcs_marker", &mut build.vcs_marker),
                ("build.publisher_dir", &mut build.publisher_dir),
                ("build.script", &mut build.script),
                ("build.interpreter", &mut build.interpreter),
                ("build.output_dir", &mut build.output_dir),
            ],
            &expand::process_env,
        )
    }

    /// Resolve paper identity and markup paths against the paper directory.
    fn resolve_paths(&mut self, paper_dir: &Path) -> Result<(), ConfigError> {
        let id = match &self.paper.id {
            Some(id) => id.clone(),
            None => paper_dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    ConfigError::Validation(format!(
                        "cannot derive paper.id from {}",
                        paper_dir.display()
                    ))
                })?,
        };
        self.paper_resolved = PaperConfig {
            dir: paper_dir.to_path_buf(),
            id,
        };
        self.resolve_markup(paper_dir);
        Ok(())
    }

    fn resolve_markup(&mut self, paper_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| paper_dir.join(path.unwrap_or(default));

        self.markup_resolved = MarkupConfig {
            sections_dir: resolve(self.markup.sections_dir.as_deref(), "sections"),
            output_dir: resolve(self.markup.output_dir.as_deref(), "sections_rst"),
            figures_file: resolve(self.markup.figures_file.as_deref(), "figures/makefigs.tex"),
            sanitized_figures_name: self
                .markup
                .sanitized_figures_name
                .clone()
                .unwrap_or_else(|| "makefigssanitized.tex".to_owned()),
        };
    }
}
