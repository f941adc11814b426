//! Entry point used by the server and the CLI.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use docforge_common::config::CompressionConfig;
use docforge_common::{Category, Error, Format, Result};

use crate::tools::ToolRegistry;
use crate::{compress, document, raster};

/// Converts and compresses files using the discovered tools.
///
/// Cheap to clone; the tool registry is shared.
#[derive(Debug, Clone)]
pub struct Converter {
    tools: Arc<ToolRegistry>,
    compression: CompressionConfig,
}

impl Converter {
    pub fn new(tools: Arc<ToolRegistry>, compression: CompressionConfig) -> Self {
        Self { tools, compression }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Convert `input` to the format named by `target` (an extension, any
    /// case), writing `{stem}.{target}` into `out_dir`.
    ///
    /// # Errors
    ///
    /// [`Error::Unsupported`] when the input has no allowed extension, the
    /// target is unknown, or the pair is not supported. Other variants come
    /// from the conversion itself.
    pub async fn convert(&self, input: &Path, target: &str, out_dir: &Path) -> Result<PathBuf> {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let source = Format::from_filename(&name)
            .ok_or_else(|| Error::Unsupported("Unsupported file type for conversion".into()))?;
        let target_format = Format::from_extension(target)
            .ok_or_else(|| Error::unsupported_pair(source, target.to_ascii_lowercase()))?;

        tracing::info!("Converting {} to {target_format}", input.display());

        match source.category() {
            Category::Document => {
                document::convert_document(&self.tools, input, source, target_format, out_dir).await
            }
            Category::Image => raster::convert_image(input, source, target_format, out_dir).await,
        }
    }

    /// Compress `input` into `out_dir` as `{stem}_compressed{ext}`.
    pub async fn compress(&self, input: &Path, out_dir: &Path) -> Result<PathBuf> {
        tracing::info!("Compressing {}", input.display());
        compress::compress_file(&self.tools, &self.compression, input, out_dir).await
    }
}
