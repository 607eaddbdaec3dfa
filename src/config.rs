//! Runner configuration
//!
//! Replaces fixed paths and constants with a TOML file loaded once at startup.
//!
//! ## Resolution order
//!
//! 1. The file named by `CONFORMANCE_RUNNER_CONFIG` (must exist).
//! 2. `conformance-runner.toml` in the working directory, if present.
//! 3. Built-in defaults (fixtures in `test/`, target `mono bin/Debug/Frontend.exe`).
//!
//! Relative paths in a config file are resolved against the directory containing that file.

use std::env;
use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use conformance_core::{ClassificationPolicy, DEFAULT_CRASH_EXIT_CODE, DEFAULT_NEGATIVE_PREFIX};
use serde::Deserialize;
use thiserror::Error;

/// Default config filename, looked up in the working directory.
pub const DEFAULT_CONFIG_NAME: &str = "conformance-runner.toml";
/// Environment variable override for the config path.
pub const CONFIG_ENV_VAR: &str = "CONFORMANCE_RUNNER_CONFIG";
/// Maximum allowed config file size in bytes.
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

/// Errors raised while loading the runner configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config file '{}' exceeds the 64 KiB size limit", .path.display())]
    TooLarge { path: PathBuf },

    #[error("invalid config file '{}': {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// When to color the `PASS`/`FAIL` tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    /// Color only when stdout is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn enabled(self) -> bool {
        match self {
            ColorChoice::Auto => io::stdout().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }
}

/// The program under test and the arguments placed before any forwarded ones.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetConfig {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("mono"),
            args: vec!["bin/Debug/Frontend.exe".to_string()],
        }
    }
}

/// Runner configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerConfig {
    /// Directory scanned (non-recursively) for fixtures
    pub fixture_dir: PathBuf,
    /// File-name prefix marking fixtures the target must reject
    pub negative_prefix: String,
    /// Exit code that always fails a fixture
    pub crash_exit_code: i32,
    pub color: ColorChoice,
    pub target: TargetConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            fixture_dir: PathBuf::from("test"),
            negative_prefix: DEFAULT_NEGATIVE_PREFIX.to_string(),
            crash_exit_code: DEFAULT_CRASH_EXIT_CODE,
            color: ColorChoice::default(),
            target: TargetConfig::default(),
        }
    }
}

impl RunnerConfig {
    /// Load the configuration following the resolution order in the module docs.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        Self::load_from(explicit.as_deref())
    }

    /// Load from an explicit path, or fall back to the working-directory file and then defaults.
    pub fn load_from(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let local = Path::new(DEFAULT_CONFIG_NAME);
        if local.is_file() {
            return Self::from_file(local);
        }

        tracing::debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// Read, parse and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        let metadata = fs::metadata(path).map_err(io_err)?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::TooLarge {
                path: path.to_path_buf(),
            });
        }

        let source = fs::read_to_string(path).map_err(io_err)?;
        let mut config = Self::parse(&source, path)?;

        if let Some(base) = path.parent() {
            config.resolve_relative_paths(base);
        }
        config.validate()?;

        tracing::debug!(config = %path.display(), fixture_dir = %config.fixture_dir.display(), "loaded config");
        Ok(config)
    }

    /// Parse and validate TOML source without touching the filesystem.
    ///
    /// Paths are left exactly as written.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config = Self::parse(source, Path::new("<string>"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target.program.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("target.program must not be empty".to_string()));
        }
        if self.negative_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "negative_prefix must not be empty (every fixture would be negative)".to_string(),
            ));
        }
        Ok(())
    }

    pub fn policy(&self) -> ClassificationPolicy {
        ClassificationPolicy::new(self.crash_exit_code)
    }

    fn parse(source: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Anchor the fixture directory and a path-like program to `base`.
    ///
    /// A bare program name (`mono`, `python3`) is left for `PATH` lookup.
    fn resolve_relative_paths(&mut self, base: &Path) {
        if self.fixture_dir.is_relative() {
            self.fixture_dir = base.join(&self.fixture_dir);
        }

        let program = &self.target.program;
        if program.is_relative() && program.components().count() > 1 {
            self.target.program = base.join(program);
        }
    }
}
