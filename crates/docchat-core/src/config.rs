//! Configuration management for DocChat.
//!
//! Loads configuration from ${DOCCHAT_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Recursively merges items from source table into target table.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source.iter() {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}

pub mod paths {
    //! Path resolution for DocChat configuration and data directories.
    //!
    //! DOCCHAT_HOME resolution order:
    //! 1. DOCCHAT_HOME environment variable (if set)
    //! 2. ~/.config/docchat (default)

    use std::path::PathBuf;

    /// Returns the DocChat home directory.
    pub fn docchat_home() -> PathBuf {
        if let Ok(home) = std::env::var("DOCCHAT_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".docchat"),
            |h| h.join(".config").join("docchat"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        docchat_home().join("config.toml")
    }

    /// Returns the directory log files are written to.
    pub fn logs_dir() -> PathBuf {
        docchat_home().join("logs")
    }

    /// Returns the user's home directory, if known.
    pub fn home_dir() -> Option<PathBuf> {
        dirs::home_dir()
    }
}

/// Preview rendering configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Longest edge of decoded image previews, in pixels.
    pub max_edge_px: u32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_edge_px: Config::DEFAULT_PREVIEW_MAX_EDGE_PX,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the DocChat backend.
    pub backend_url: String,

    /// Path of the upload endpoint, relative to `backend_url`.
    pub upload_path: String,

    /// Path of the ask endpoint, relative to `backend_url`.
    pub ask_path: String,

    /// Timeout for backend requests in seconds (0 disables)
    pub request_timeout_secs: u32,

    /// Default tracing filter.
    pub log_filter: String,

    /// Preview configuration.
    #[serde(default)]
    pub preview: PreviewConfig,
}

impl Config {
    const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
    const DEFAULT_UPLOAD_PATH: &str = "/upload";
    const DEFAULT_ASK_PATH: &str = "/ask";
    /// Uploads run OCR and embedding on the backend, so the default is generous.
    const DEFAULT_REQUEST_TIMEOUT_SECS: u32 = 300;
    const DEFAULT_LOG_FILTER: &str = "info";
    const DEFAULT_PREVIEW_MAX_EDGE_PX: u32 = 1024;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Returns the request timeout, or `None` when disabled.
    pub fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(u64::from(self.request_timeout_secs)))
        }
    }

    /// Returns the full URL of the upload endpoint.
    pub fn upload_url(&self) -> String {
        join_url(&self.backend_url, &self.upload_path)
    }

    /// Returns the full URL of the ask endpoint.
    pub fn ask_url(&self) -> String {
        join_url(&self.backend_url, &self.ask_path)
    }

    /// Returns the backend root URL (health check endpoint).
    pub fn health_url(&self) -> String {
        join_url(&self.backend_url, "/")
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Generates a fresh config TOML from Rust defaults.
    ///
    /// Uses the embedded template for structure/comments and merges
    /// generated values from `Config::default()` into it.
    pub fn generate() -> Result<String> {
        use toml_edit::DocumentMut;

        let generated_toml = toml::to_string(&Config::default())
            .context("Failed to serialize default config to TOML")?;

        let mut doc: DocumentMut = default_config_template()
            .parse()
            .context("Failed to parse default config template")?;

        let generated_doc: DocumentMut = generated_toml
            .parse()
            .context("Failed to parse generated config")?;

        merge_items(doc.as_table_mut(), generated_doc.as_table());

        Ok(doc.to_string())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: Self::DEFAULT_BACKEND_URL.to_string(),
            upload_path: Self::DEFAULT_UPLOAD_PATH.to_string(),
            ask_path: Self::DEFAULT_ASK_PATH.to_string(),
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            log_filter: Self::DEFAULT_LOG_FILTER.to_string(),
            preview: PreviewConfig::default(),
        }
    }
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim().trim_end_matches('/');
    let path = path.trim().trim_start_matches('/');
    if path.is_empty() {
        format!("{base}/")
    } else {
        format!("{base}/{path}")
    }
}
