//! Configuration loading and root folder resolution

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::placeholder::{PlaceholderImages, DEFAULT_PLACEHOLDER_BASE};
use crate::{Error, Result};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "GARAGE_ROOT_FOLDER";

/// Environment variable carrying the Gemini API key
pub const GEMINI_API_KEY_ENV: &str = "GARAGE_GEMINI_API_KEY";

/// Default HTTP port of the UI service
pub const DEFAULT_PORT: u16 = 5780;

/// Model used for reference photo searches
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "garage.db";

/// Optional settings read from `config.toml`
///
/// Every key may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub port: Option<u16>,
    /// `tracing_subscriber::EnvFilter` directive, e.g. `"info"` or `"gc_ui=debug"`
    pub log_level: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: Option<String>,
    pub placeholder_base: Option<String>,
}

impl TomlConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load `explicit` if given, else the per-user default file.
    ///
    /// A missing or malformed file is logged and replaced by defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Self {
        let path = match explicit.map(Path::to_path_buf).or_else(default_config_path) {
            Some(path) => path,
            None => return Self::default(),
        };

        if !path.exists() {
            if explicit.is_some() {
                warn!("Config file {} not found, using defaults", path.display());
            }
            return Self::default();
        }

        match Self::load(&path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn gemini_model(&self) -> &str {
        self.gemini_model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_GEMINI_MODEL)
    }

    pub fn placeholders(&self) -> PlaceholderImages {
        PlaceholderImages::new(
            self.placeholder_base
                .as_deref()
                .filter(|b| !b.trim().is_empty())
                .unwrap_or(DEFAULT_PLACEHOLDER_BASE),
        )
    }
}

/// `<config dir>/garage-cloud/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("garage-cloud").join("config.toml"))
}

/// Root folder resolution, highest priority first:
/// 1. Command-line argument
/// 2. `GARAGE_ROOT_FOLDER`
/// 3. `root_folder` in the TOML config
/// 4. OS-dependent default
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("garage-cloud"))
        .unwrap_or_else(|| PathBuf::from("./garage_data"))
}

/// Prepares the root folder before the database is opened
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }
}

/// Gemini API key: environment first, then TOML. Blank values are ignored.
pub fn resolve_gemini_api_key(toml: &TomlConfig) -> Option<String> {
    if let Ok(key) = std::env::var(GEMINI_API_KEY_ENV) {
        if !key.trim().is_empty() {
            info!("Gemini API key loaded from environment variable");
            return Some(key.trim().to_string());
        }
    }

    if let Some(key) = toml.gemini_api_key.as_deref() {
        if !key.trim().is_empty() {
            info!("Gemini API key loaded from TOML config");
            return Some(key.trim().to_string());
        }
    }

    warn!("No Gemini API key configured; photo search will return placeholders");
    None
}
