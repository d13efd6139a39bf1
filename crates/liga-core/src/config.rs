// Configuration loading and parsing (liga.toml, credentials.toml).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::model::Country;

/// Environment variable overriding `[backend] url`.
pub const ENV_BACKEND_URL: &str = "LIGA_BACKEND_URL";
/// Environment variable overriding the anon key from credentials.toml.
pub const ENV_ANON_KEY: &str = "LIGA_ANON_KEY";

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

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    pub ui: UiConfig,
    pub database: DatabaseConfig,
    pub credentials: CredentialsConfig,
}

/// Raw deserialization target for liga.toml.
#[derive(Debug, Clone, Deserialize)]
struct LigaFile {
    backend: BackendConfig,
    #[serde(default)]
    ui: UiConfig,
    #[serde(default)]
    database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Project base URL; `/auth/v1` and `/rest/v1` are appended.
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    /// Country tab shown on first start.
    #[serde(default = "default_country")]
    pub default_country: Country,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            default_country: default_country(),
        }
    }
}

fn default_country() -> Country {
    Country::De
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file for the local session cache. Empty means the platform
    /// data directory.
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    /// Public anon key sent as `apikey` on every request.
    pub anon_key: Option<String>,
}

impl Config {
    /// The anon key, or an empty string when none is configured.
    pub fn anon_key(&self) -> &str {
        self.credentials.anon_key.as_deref().unwrap_or("")
    }

    /// Resolve the database path, falling back to the platform data dir.
    pub fn db_path(&self) -> Result<PathBuf, ConfigError> {
        if !self.database.path.trim().is_empty() {
            return Ok(PathBuf::from(&self.database.path));
        }
        let dirs = directories::ProjectDirs::from("de", "liga", "liga-ranking").ok_or_else(|| {
            ConfigError::ValidationError {
                field: "database.path".into(),
                message: "empty and no home directory to fall back to".into(),
            }
        })?;
        let dir = dirs.data_dir();
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::ValidationError {
            field: "database.path".into(),
            message: format!("cannot create {}: {e}", dir.display()),
        })?;
        Ok(dir.join("liga.db"))
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/liga.toml` and (optionally)
/// `config/credentials.toml` relative to `base_dir`.
///
/// Does not copy defaults or read the environment; see `load_config()`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- liga.toml (required) ---
    let liga_path = config_dir.join("liga.toml");
    let liga_text = read_file(&liga_path)?;
    let liga_file: LigaFile = toml::from_str(&liga_text).map_err(|e| ConfigError::ParseError {
        path: liga_path.clone(),
        source: e,
    })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        backend: liga_file.backend,
        ui: liga_file.ui,
        database: liga_file.database,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Seeds `config/` from the shipped `defaults/`. Files already present in
/// `config/` are left alone, as are `*.example` templates. Returns the paths
/// that were written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    fn copy_error(message: String) -> ConfigError {
        ConfigError::DefaultsCopyError { message }
    }

    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        // A deployed install may ship config/ alone.
        return if config_dir.is_dir() {
            Ok(Vec::new())
        } else {
            Err(copy_error(format!(
                "no defaults/ or config/ directory under {}; start liga from its install directory",
                base_dir.display()
            )))
        };
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| copy_error(format!("cannot create {}: {e}", config_dir.display())))?;
    let entries = std::fs::read_dir(&defaults_dir)
        .map_err(|e| copy_error(format!("cannot list {}: {e}", defaults_dir.display())))?;

    let mut seeded = Vec::new();
    for entry in entries {
        let source = entry
            .map_err(|e| copy_error(format!("cannot list {}: {e}", defaults_dir.display())))?
            .path();
        let Some(name) = source.file_name().filter(|_| source.is_file()) else {
            continue;
        };
        let is_template = name.to_string_lossy().ends_with(".example");
        let target = config_dir.join(name);
        if is_template || target.exists() {
            continue;
        }
        std::fs::copy(&source, &target).map_err(|e| {
            copy_error(format!("cannot seed {} from {}: {e}", target.display(), source.display()))
        })?;
        info!("Seeded {} from defaults", target.display());
        seeded.push(target);
    }

    Ok(seeded)
}

/// Loads config relative to the current working directory, copying defaults
/// first and applying `LIGA_*` environment overrides last.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    let mut config = load_config_from(&cwd)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate(&config)?;
    Ok(config)
}

/// Apply `LIGA_BACKEND_URL` / `LIGA_ANON_KEY` from `lookup`. Empty values are
/// ignored.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(ENV_BACKEND_URL).filter(|v| !v.trim().is_empty()) {
        config.backend.url = url;
    }
    if let Some(key) = lookup(ENV_ANON_KEY).filter(|v| !v.trim().is_empty()) {
        config.credentials.anon_key = Some(key);
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let url = config.backend.url.trim();
    if url.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "backend.url".into(),
            message: "must not be empty".into(),
        });
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::ValidationError {
            field: "backend.url".into(),
            message: format!("must start with http:// or https://, got {url}"),
        });
    }
    if let Some(key) = &config.credentials.anon_key {
        if key.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: "credentials.anon_key".into(),
                message: "must not be blank when present".into(),
            });
        }
    }
    Ok(())
}
