//! Output compression.
//!
//! Images are re-encoded, PDFs go through Ghostscript, and everything else
//! (or anything whose compressor is unavailable) is copied unchanged to
//! `{stem}_compressed{ext}`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use docforge_common::config::CompressionConfig;
use docforge_common::{names, Error, Format, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::DynamicImage;

use crate::command::ToolCommand;
use crate::raster;
use crate::tools::{ToolRegistry, GHOSTSCRIPT};
use crate::workspace::{output_file_name, Workspace};

const SUFFIX: &str = "_compressed";

/// Compress `input` into `out_dir`, returning the path written.
pub async fn compress_file(
    tools: &ToolRegistry,
    settings: &CompressionConfig,
    input: &Path,
    out_dir: &Path,
) -> Result<PathBuf> {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (stem, ext) = names::split_name(&name);
    let dest = match ext {
        Some(ext) => out_dir.join(format!("{stem}{SUFFIX}.{ext}")),
        None => out_dir.join(format!("{stem}{SUFFIX}")),
    };

    match Format::from_filename(&name) {
        Some(
            format @ (Format::Jpg
            | Format::Jpeg
            | Format::Png
            | Format::Gif
            | Format::Bmp
            | Format::Tiff),
        ) => compress_image(input, format, settings.jpeg_quality, out_dir).await,
        Some(Format::Pdf) => compress_pdf(tools, &settings.pdf_preset, input, &dest).await,
        _ => copy_through(input, &dest).await,
    }
}

/// Copy the input unchanged to `dest`.
async fn copy_through(input: &Path, dest: &Path) -> Result<PathBuf> {
    tokio::fs::copy(input, dest).await?;
    Ok(dest.to_path_buf())
}

async fn compress_pdf(
    tools: &ToolRegistry,
    preset: &str,
    input: &Path,
    dest: &Path,
) -> Result<PathBuf> {
    match run_ghostscript(tools, preset, input, dest).await {
        Ok(path) => Ok(path),
        Err(e) => {
            tracing::warn!(
                "PDF compression failed for {} ({e}), copying unchanged",
                input.display()
            );
            copy_through(input, dest).await
        }
    }
}

async fn run_ghostscript(
    tools: &ToolRegistry,
    preset: &str,
    input: &Path,
    dest: &Path,
) -> Result<PathBuf> {
    let gs = tools.require(GHOSTSCRIPT)?;
    let ws = Workspace::new(input)?;
    let produced = ws.temp_file("compressed.pdf");

    let mut cmd = ToolCommand::new(gs.path.clone());
    cmd.args(["-sDEVICE=pdfwrite", "-dCompatibilityLevel=1.4"])
        .arg(format!("-dPDFSETTINGS=/{preset}"))
        .args(["-dNOPAUSE", "-dQUIET", "-dBATCH"])
        .arg(format!("-sOutputFile={}", produced.display()))
        .arg(input.to_string_lossy())
        .timeout(gs.timeout);
    cmd.execute().await?;

    ws.finalize(&produced, dest)
}

async fn compress_image(
    input: &Path,
    format: Format,
    quality: u8,
    out_dir: &Path,
) -> Result<PathBuf> {
    let ws = Workspace::new(input)?;
    let src = input.to_path_buf();
    let work_dir = ws.temp_dir().to_path_buf();

    let (produced, ext) =
        tokio::task::spawn_blocking(move || reencode(&src, format, quality, &work_dir))
            .await
            .map_err(|e| Error::Internal(format!("compression task failed: {e}")))??;

    let dest = out_dir.join(output_file_name(input, SUFFIX, &ext));
    ws.finalize(&produced, &dest)
}

/// Re-encode an image inside `work_dir`, returning the produced path and
/// its extension.
///
/// Images with an alpha channel are flattened to RGB and written as JPEG.
fn reencode(
    input: &Path,
    format: Format,
    quality: u8,
    work_dir: &Path,
) -> Result<(PathBuf, String)> {
    let img = raster::decode(input)?;

    if img.color().has_alpha() {
        let flat = DynamicImage::ImageRgb8(img.to_rgb8());
        let out = work_dir.join("compressed.jpg");
        write_jpeg(&flat, quality, &out)?;
        return Ok((out, "jpg".to_string()));
    }

    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| format.extension().to_string());
    let out = work_dir.join(format!("compressed.{ext}"));

    match format {
        Format::Jpg | Format::Jpeg => {
            write_jpeg(&DynamicImage::ImageRgb8(img.to_rgb8()), quality, &out)?
        }
        Format::Png => {
            let mut writer = BufWriter::new(File::create(&out)?);
            let encoder = PngEncoder::new_with_quality(
                &mut writer,
                CompressionType::Best,
                FilterType::Adaptive,
            );
            img.write_with_encoder(encoder).map_err(encode_error)?;
            writer.flush()?;
        }
        other => {
            let codec = raster::image_format(other)
                .ok_or_else(|| Error::Unsupported(format!("cannot compress {other}")))?;
            raster::prepare_for(img, other)
                .save_with_format(&out, codec)
                .map_err(encode_error)?;
        }
    }

    Ok((out, ext))
}

fn write_jpeg(img: &DynamicImage, quality: u8, out: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(out)?);
    let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
    img.write_with_encoder(encoder).map_err(encode_error)?;
    writer.flush()?;
    Ok(())
}

fn encode_error(e: image::ImageError) -> Error {
    Error::Conversion(format!("cannot encode compressed image: {e}"))
}
