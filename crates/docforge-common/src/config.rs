//! Configuration sections shared between the converter crate and the server.
//!
//! Both structs deserialize from their TOML section with every field
//! optional, so an empty `[tools]` or `[compression]` table is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ghostscript `-dPDFSETTINGS` presets accepted by [`CompressionConfig`].
pub const PDF_PRESETS: &[&str] = &["screen", "ebook", "printer", "prepress", "default"];

/// Paths and limits for external CLI tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// LibreOffice binary; falls back to `soffice` on `PATH`.
    pub soffice_path: Option<PathBuf>,
    /// Ghostscript binary; falls back to `gs` on `PATH`.
    pub gs_path: Option<PathBuf>,
    /// Maximum run time of a single tool invocation.
    pub timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            soffice_path: None,
            gs_path: None,
            timeout_secs: 120,
        }
    }
}

/// Output settings for the compression step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// JPEG quality (1-100) used when compressing images.
    pub jpeg_quality: u8,
    /// Ghostscript preset name, without the leading slash.
    pub pdf_preset: String,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 85,
            pdf_preset: "ebook".into(),
        }
    }
}
