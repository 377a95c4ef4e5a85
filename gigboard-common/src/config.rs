//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration comes from an optional TOML file. Every field has a
//! built-in default, so a missing file logs a warning and the service starts
//! with defaults.
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. `GIGBOARD_ROOT_FOLDER` environment variable
//! 3. TOML config file `root_folder`
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable consulted for the root folder
pub const ROOT_FOLDER_ENV: &str = "GIGBOARD_ROOT_FOLDER";

/// Storage key of the in-progress listing draft
pub const DEFAULT_DRAFT_KEY: &str = "listing_wizard_draft";

/// Stock image used whenever a listing has no usable image
pub const DEFAULT_PLACEHOLDER_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1501386761578-eac5c94b800a?w=1200";

/// Database file name inside the root folder
const DATABASE_FILE: &str = "gigboard.db";

/// Media directory name inside the root folder
const MEDIA_DIR: &str = "media";

/// Bootstrap configuration loaded from TOML file
///
/// These settings cannot change during runtime.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Root folder for the database and uploaded media (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Listing wizard configuration
    #[serde(default)]
    pub wizard: WizardConfig,

    /// Media upload configuration
    #[serde(default)]
    pub media: MediaConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Listing wizard configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WizardConfig {
    /// Key of the durable draft slot
    #[serde(default = "default_draft_key")]
    pub draft_key: String,

    /// Fallback image URL for listings without an uploaded image
    #[serde(default = "default_placeholder_image_url")]
    pub placeholder_image_url: String,
}

/// Media upload configuration
///
/// With no `upload_endpoint`, uploads are written below the root folder and
/// served by the wizard service itself.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Remote object store endpoint (HTTP PUT target)
    #[serde(default)]
    pub upload_endpoint: Option<String>,

    /// Base URL under which uploaded objects are publicly reachable
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

fn default_port() -> u16 {
    5731
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_draft_key() -> String {
    DEFAULT_DRAFT_KEY.to_string()
}

fn default_placeholder_image_url() -> String {
    DEFAULT_PLACEHOLDER_IMAGE_URL.to_string()
}

fn default_public_base_url() -> String {
    format!("http://127.0.0.1:{}/media", default_port())
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            root_folder: None,
            logging: LoggingConfig::default(),
            wizard: WizardConfig::default(),
            media: MediaConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            draft_key: default_draft_key(),
            placeholder_image_url: default_placeholder_image_url(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            upload_endpoint: None,
            public_base_url: default_public_base_url(),
        }
    }
}

/// Load bootstrap configuration from a TOML file
///
/// A missing file is not an error: a warning is logged and defaults are
/// returned. A file that exists but fails to parse is a configuration error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file not found at {}, using built-in defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Default configuration file path for the platform
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("gigboard").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("./gigboard.toml"))
}

/// Compiled defaults used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            log_level: default_log_level(),
        }
    }
}

fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/gigboard
        dirs::data_local_dir()
            .map(|d| d.join("gigboard"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/gigboard"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/gigboard
        dirs::data_dir()
            .map(|d| d.join("gigboard"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/gigboard"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\gigboard
        dirs::data_local_dir()
            .map(|d| d.join("gigboard"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\gigboard"))
    } else {
        PathBuf::from("./gigboard_data")
    }
}

/// Resolves the root folder following the priority order in the module docs
#[derive(Debug, Clone, Default)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of the `--root-folder` command-line argument
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    /// `root_folder` from the loaded TOML configuration
    pub fn with_toml(mut self, config: &TomlConfig) -> Self {
        self.toml_root = config.root_folder.clone();
        self
    }

    pub fn resolve(&self) -> PathBuf {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        // Priority 2: Environment variable (empty values are ignored)
        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        // Priority 3: TOML config file
        if let Some(path) = &self.toml_root {
            return path.clone();
        }

        // Priority 4: OS-dependent compiled default
        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Creates the root folder layout and derives the paths inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder and media directory if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            info!("Creating root folder: {}", self.root_folder.display());
        }
        std::fs::create_dir_all(self.media_path())?;
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }

    pub fn media_path(&self) -> PathBuf {
        self.root_folder.join(MEDIA_DIR)
    }
}
