mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    expand_paths(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./config.toml",
        "./docforge.toml",
        "~/.config/docforge/config.toml",
        "/etc/docforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref())
}

fn expand_paths(config: &mut Config) {
    config.storage.upload_dir = expand(&config.storage.upload_dir);
    config.storage.processed_dir = expand(&config.storage.processed_dir);
    config.server.static_dir = config.server.static_dir.as_deref().map(expand);
    config.tools.soffice_path = config.tools.soffice_path.as_deref().map(expand);
    config.tools.gs_path = config.tools.gs_path.as_deref().map(expand);
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.server.max_upload_mb == 0 {
        anyhow::bail!("server.max_upload_mb must be greater than 0");
    }

    if let Some(dir) = &config.server.static_dir {
        if !dir.is_dir() {
            tracing::warn!("Static directory does not exist: {:?}", dir);
        }
    }

    if config.storage.upload_dir == config.storage.processed_dir {
        anyhow::bail!(
            "storage.upload_dir and storage.processed_dir must differ (both {:?})",
            config.storage.upload_dir
        );
    }

    if !(1..=100).contains(&config.compression.jpeg_quality) {
        anyhow::bail!(
            "compression.jpeg_quality must be between 1 and 100, got {}",
            config.compression.jpeg_quality
        );
    }

    if !PDF_PRESETS.contains(&config.compression.pdf_preset.as_str()) {
        anyhow::bail!(
            "compression.pdf_preset '{}' is not one of: {}",
            config.compression.pdf_preset,
            PDF_PRESETS.join(", ")
        );
    }

    Ok(())
}
