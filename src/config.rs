use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::segment::{SegmentVocab, DEFAULT_HEADINGS, DEFAULT_STOP_HEADINGS};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub segmenter: SegmenterConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:11434/api/generate".to_string()
}
fn default_model() -> String {
    "mistral".to_string()
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_max_retries() -> u32 {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct SegmenterConfig {
    #[serde(default = "default_headings")]
    pub headings: Vec<String>,
    #[serde(default = "default_stop_headings")]
    pub stop_headings: Vec<String>,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            headings: default_headings(),
            stop_headings: default_stop_headings(),
        }
    }
}

fn default_headings() -> Vec<String> {
    DEFAULT_HEADINGS.iter().map(|s| s.to_string()).collect()
}
fn default_stop_headings() -> Vec<String> {
    DEFAULT_STOP_HEADINGS.iter().map(|s| s.to_string()).collect()
}

impl SegmenterConfig {
    pub fn vocab(&self) -> SegmentVocab {
        SegmentVocab::new(&self.headings, &self.stop_headings)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            include_globs: default_include_globs(),
        }
    }
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.pdf".to_string(), "**/*.docx".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8087".to_string()
}

/// Load configuration from a TOML file, falling back to built-in defaults
/// when the file does not exist.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.model.timeout_secs == 0 {
        anyhow::bail!("model.timeout_secs must be > 0");
    }

    if config.model.endpoint.trim().is_empty() {
        anyhow::bail!("model.endpoint must not be empty");
    }

    if config.segmenter.headings.is_empty() {
        anyhow::bail!("segmenter.headings must not be empty");
    }

    if config.ingest.include_globs.is_empty() {
        anyhow::bail!("ingest.include_globs must not be empty");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config(Path::new("/nonexistent/rex.toml")).unwrap();
        assert_eq!(config.model.model, "mistral");
        assert_eq!(config.model.max_retries, 3);
        assert_eq!(config.ingest.include_globs.len(), 2);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rex.toml");
        std::fs::write(&path, "[model]\nmodel = \"llama3\"\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.model.model, "llama3");
        assert_eq!(config.model.timeout_secs, 60);
        assert_eq!(config.server.bind, "127.0.0.1:8087");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rex.toml");
        std::fs::write(&path, "[model]\ntimeout_secs = 0\n").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn empty_heading_list_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rex.toml");
        std::fs::write(&path, "[segmenter]\nheadings = []\n").unwrap();
        assert!(load_config(&path).is_err());
    }
}
