use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub vault: VaultConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub index: IndexConfig,
    pub state: StateConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct VaultConfig {
    pub root: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.md".to_string(), "**/*.txt".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Seconds between upload-operation polls.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Poll-attempt ceiling per document; exceeding it fails that item only.
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            max_poll_attempts: default_max_poll_attempts(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_poll_interval_secs() -> u64 {
    5
}
fn default_max_poll_attempts() -> u32 {
    36
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    /// Display name used when creating the remote index.
    #[serde(default = "default_display_name")]
    pub display_name: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            display_name: default_display_name(),
        }
    }
}

fn default_display_name() -> String {
    "vault-recall".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct StateConfig {
    /// Path of the JSON file holding the persisted engine state.
    pub path: PathBuf,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.vault.include_globs.is_empty() {
        anyhow::bail!("vault.include_globs must not be empty");
    }

    if config.backend.model.trim().is_empty() {
        anyhow::bail!("backend.model must not be empty");
    }

    if config.backend.max_poll_attempts == 0 {
        anyhow::bail!("backend.max_poll_attempts must be >= 1");
    }

    if config.backend.poll_interval_secs == 0 {
        anyhow::bail!("backend.poll_interval_secs must be >= 1");
    }

    if config.index.display_name.trim().is_empty() {
        anyhow::bail!("index.display_name must not be empty");
    }

    Ok(config)
}
