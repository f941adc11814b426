use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use docforge_common::config::{CompressionConfig, ToolsConfig, PDF_PRESETS};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub compression: CompressionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory with the browser front end, served at `/`.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,

    /// Largest accepted request body, in megabytes.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_max_upload_mb() -> u64 {
    50
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

impl ServerConfig {
    pub fn max_upload_bytes(&self) -> usize {
        usize::try_from(self.max_upload_mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    #[serde(default = "default_processed_dir")]
    pub processed_dir: PathBuf,

    /// Uploads older than this are deleted by the reaper.
    #[serde(default = "default_upload_max_age")]
    pub upload_max_age_mins: u64,

    /// Converted files older than this are deleted by the reaper.
    #[serde(default = "default_processed_max_age")]
    pub processed_max_age_mins: u64,

    /// Period of the background sweep; 0 disables it. Requests always
    /// trigger a sweep regardless.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads/temp")
}
fn default_processed_dir() -> PathBuf {
    PathBuf::from("uploads/processed")
}
fn default_upload_max_age() -> u64 {
    10
}
fn default_processed_max_age() -> u64 {
    30
}
fn default_sweep_interval() -> u64 {
    60
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            processed_dir: default_processed_dir(),
            upload_max_age_mins: default_upload_max_age(),
            processed_max_age_mins: default_processed_max_age(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}
