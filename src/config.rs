//! Configuration constants and the optional config file.
//!
//! The config file at `~/.config/qkb/config.yml` supplies defaults for the
//! root directory and glob pattern; command-line flags always win.

use crate::error::{KbError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default glob pattern for markdown files.
pub const DEFAULT_GLOB: &str = "**/*.md";

/// Default number of search results.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Maximum snippet length in characters.
pub const SNIPPET_MAX_CHARS: usize = 240;

/// Minimum token length kept by the tokenizer.
pub const MIN_TOKEN_LEN: usize = 2;

/// Directories to exclude from loading.
pub const EXCLUDE_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".cache",
    "vendor",
    "dist",
    "build",
    "target",
];

/// English stopwords dropped by the tokenizer.
pub const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "have", "if",
    "in", "is", "it", "its", "not", "of", "on", "or", "that", "the", "this", "to", "was", "what",
    "when", "which", "will", "with", "you", "your",
];

/// The config file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Default root directory to load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    /// Default glob pattern.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Extra stopwords merged with the built-in list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stopwords: Vec<String>,
}

/// Get the config directory.
///
/// Returns `~/.config/qkb` on Unix-like systems; `QKB_CONFIG_DIR` overrides.
pub fn get_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("QKB_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("qkb"))
}

/// Get the config file path.
pub fn get_config_path() -> Option<PathBuf> {
    let config_dir = get_config_dir()?;
    Some(config_dir.join("config.yml"))
}

/// Load configuration from the config file.
/// Returns an empty config if the file doesn't exist.
pub fn load_config() -> Result<Config> {
    let Some(config_path) = get_config_path() else {
        return Ok(Config::default());
    };

    if !config_path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&config_path)?;
    let config: Config = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to the config file.
pub fn save_config(config: &Config) -> Result<()> {
    let config_dir = get_config_dir()
        .ok_or_else(|| KbError::Config("Could not determine config directory".to_string()))?;
    fs::create_dir_all(&config_dir)?;

    let yaml = serde_yaml::to_string(config)?;
    fs::write(config_dir.join("config.yml"), yaml)?;
    Ok(())
}
