// Configuration loading and parsing (engine.toml, service.toml).

use genome_core::{EngineConfig, ScoringError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

impl From<ScoringError> for ConfigError {
    fn from(e: ScoringError) -> Self {
        match e {
            ScoringError::InvalidConfig { field, message } => {
                ConfigError::ValidationError { field, message }
            }
            other => ConfigError::ValidationError {
                field: "engine".into(),
                message: other.to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub engine: EngineConfig,
    pub service: ServiceConfig,
}

// ---------------------------------------------------------------------------
// service.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct ServiceFile {
    websocket: WebsocketSection,
    data_paths: DataPaths,
    #[serde(default)]
    leaderboard: LeaderboardSection,
}

#[derive(Debug, Clone, Deserialize)]
struct WebsocketSection {
    port: u16,
}

#[derive(Debug, Clone, Deserialize)]
struct LeaderboardSection {
    preview_size: usize,
}

impl Default for LeaderboardSection {
    fn default() -> Self {
        LeaderboardSection { preview_size: 10 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub athletes: String,
}

/// Process-level settings assembled from service.toml.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub ws_port: u16,
    pub data_paths: DataPaths,
    /// How many leaderboard rows to log at startup.
    pub leaderboard_preview: usize,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/engine.toml` and `config/service.toml` relative
/// to `base_dir`. Does not copy defaults; see [`load_config`].
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- engine.toml (required, every table optional) ---
    let engine: EngineConfig = parse_toml(&config_dir.join("engine.toml"))?;

    // --- service.toml (required) ---
    let service_file: ServiceFile = parse_toml(&config_dir.join("service.toml"))?;
    let service = ServiceConfig {
        ws_port: service_file.websocket.port,
        data_paths: service_file.data_paths,
        leaderboard_preview: service_file.leaderboard.preview_size,
    };

    let config = Config { engine, service };
    validate(&config)?;
    Ok(config)
}

/// Copy every file in `defaults/` that is missing from `config/`, skipping
/// `*.example` templates. Returns the paths that were written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if config_dir.exists() {
            return Ok(vec![]);
        }
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither defaults/ nor config/ directory found in {}; \
                 run from the genome-app directory or ensure defaults/ is present",
                base_dir.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| copy_error("create config directory", e))?;

    let entries =
        std::fs::read_dir(&defaults_dir).map_err(|e| copy_error("read defaults directory", e))?;

    let mut copied = Vec::new();
    for entry in entries {
        let source = entry.map_err(|e| copy_error("read defaults entry", e))?.path();
        let Some(file_name) = source.file_name() else {
            continue;
        };
        let is_template = file_name.to_str().is_some_and(|n| n.ends_with(".example"));
        if !source.is_file() || is_template {
            continue;
        }

        let target = config_dir.join(file_name);
        if copy_if_absent(&source, &target)? {
            copied.push(target);
        }
    }

    Ok(copied)
}

/// Loads config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn copy_error(action: &str, e: std::io::Error) -> ConfigError {
    ConfigError::DefaultsCopyError {
        message: format!("failed to {action}: {e}"),
    }
}

/// Create `target` with the contents of `source` unless it already exists.
/// Returns whether a file was written.
fn copy_if_absent(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(copy_error(&format!("create {}", target.display()), e)),
    };
    let content =
        std::fs::read(source).map_err(|e| copy_error(&format!("read {}", source.display()), e))?;
    std::io::Write::write_all(&mut dest, &content)
        .map_err(|e| copy_error(&format!("write {}", target.display()), e))?;
    Ok(true)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    config.engine.validate()?;

    if config.service.ws_port == 0 {
        return Err(ConfigError::ValidationError {
            field: "websocket.port".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.service.data_paths.athletes.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "data_paths.athletes".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
