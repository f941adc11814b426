//! Raster image conversion.

use std::path::{Path, PathBuf};

use docforge_common::{Category, Error, Format, Result};
use image::{DynamicImage, ImageFormat};

use crate::workspace::{output_file_name, Workspace};

/// The `image` crate codec for an image [`Format`].
pub(crate) fn image_format(format: Format) -> Option<ImageFormat> {
    match format {
        Format::Png => Some(ImageFormat::Png),
        Format::Jpg | Format::Jpeg => Some(ImageFormat::Jpeg),
        Format::Gif => Some(ImageFormat::Gif),
        Format::Bmp => Some(ImageFormat::Bmp),
        Format::Tiff => Some(ImageFormat::Tiff),
        Format::Webp => Some(ImageFormat::WebP),
        _ => None,
    }
}

/// Decode an image, sniffing the format from its content.
pub(crate) fn decode(path: &Path) -> Result<DynamicImage> {
    image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| Error::Conversion(format!("cannot decode {}: {e}", path.display())))
}

/// Adjust the pixel layout to something the target encoder accepts.
pub(crate) fn prepare_for(img: DynamicImage, target: Format) -> DynamicImage {
    match target {
        Format::Jpg | Format::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
        Format::Gif | Format::Webp => DynamicImage::ImageRgba8(img.to_rgba8()),
        Format::Bmp if img.color().has_alpha() => DynamicImage::ImageRgba8(img.to_rgba8()),
        Format::Bmp => DynamicImage::ImageRgb8(img.to_rgb8()),
        _ => img,
    }
}

/// Convert an image to another image format, writing
/// `{out_dir}/{stem}.{target}`.
pub async fn convert_image(
    input: &Path,
    source: Format,
    target: Format,
    out_dir: &Path,
) -> Result<PathBuf> {
    let codec = match image_format(target) {
        Some(codec) if target.category() == Category::Image => codec,
        _ => return Err(Error::unsupported_pair(source, target)),
    };

    let ws = Workspace::new(input)?;
    let produced = ws.output_with_extension(target.extension());
    let src = input.to_path_buf();
    let out = produced.clone();

    tracing::debug!("image {} ({source} -> {target})", input.display());

    tokio::task::spawn_blocking(move || -> Result<()> {
        let img = prepare_for(decode(&src)?, target);
        img.save_with_format(&out, codec)
            .map_err(|e| Error::Conversion(format!("cannot encode {target}: {e}")))
    })
    .await
    .map_err(|e| Error::Internal(format!("image conversion task failed: {e}")))??;

    let dest = out_dir.join(output_file_name(input, "", target.extension()));
    ws.finalize(&produced, &dest)
}
