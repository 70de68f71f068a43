//! Application configuration for champscout.
//!
//! User config lives at `~/.champscout/champscout.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoutError};
use crate::types::{DEFAULT_TOP_N, Locale};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "champscout.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".champscout";

const CONFIG_HEADER: &str = "\
# champscout configuration
#
# Empty [selectors] lists and [markers] keep the built-in values.
# A non-empty selector list replaces the built-in one and is tried in order.

";

// ---------------------------------------------------------------------------
// Config structs (matching champscout.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Page fetching.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Selector strategy overrides.
    #[serde(default)]
    pub selectors: SelectorsConfig,

    /// Row filter marker overrides.
    #[serde(default)]
    pub markers: MarkersConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// How many records each extractor returns.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Page language.
    #[serde(default)]
    pub locale: Locale,

    /// Server region path segment (e.g. `kr`, `euw`).
    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            locale: Locale::default(),
            region: default_region(),
        }
    }
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}
fn default_region() -> String {
    "kr".into()
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Site root, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://op.gg".into()
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122 Safari/537.36".into()
}
fn default_timeout_secs() -> u64 {
    10
}

/// `[selectors]` section. Empty lists keep the built-in strategies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectorsConfig {
    /// Node selectors for "most played" rows, most specific first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub champions: Vec<String>,

    /// Node selectors for mastery entries, most specific first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mastery: Vec<String>,
}

/// `[markers]` section. Unset values keep the locale defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkersConfig {
    /// Substrings marking an aggregate "all champions" row.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aggregate: Vec<String>,

    /// Substring marking a head-to-head sub-row (matched case-insensitively).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versus: Option<String>,
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.champscout/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ScoutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.champscout/champscout.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ScoutError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| ScoutError::config(format!("failed to parse {}: {e}", path.display())))?;

    config.validate()?;
    Ok(config)
}

/// Write the default config file under `~/.champscout/`.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let path = config_file_path()?;
    write_default_config(&path)?;
    Ok(path)
}

/// Write the default config to `path`, creating its directory.
/// An existing file is never overwritten.
pub fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(ScoutError::config(format!(
            "{} already exists; edit it or remove it first",
            path.display()
        )));
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ScoutError::io(dir, e))?;
    }

    let body = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| ScoutError::config(e.to_string()))?;
    std::fs::write(path, format!("{CONFIG_HEADER}{body}")).map_err(|e| ScoutError::io(path, e))?;

    tracing::info!(?path, "created default config file");
    Ok(())
}

impl AppConfig {
    /// Reject values no extraction run could use.
    pub fn validate(&self) -> Result<()> {
        if self.defaults.top_n == 0 {
            return Err(ScoutError::config("defaults.top_n must be at least 1"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ScoutError::config("fetch.timeout_secs must be at least 1"));
        }
        let mut selectors = self.selectors.champions.iter().chain(&self.selectors.mastery);
        if selectors.any(|s| s.trim().is_empty()) {
            return Err(ScoutError::config("selectors must not contain blank entries"));
        }
        if let Some(versus) = &self.markers.versus {
            if versus.trim().is_empty() {
                return Err(ScoutError::config("markers.versus must not be blank"));
            }
        }
        Ok(())
    }
}
