//! File formats accepted by docforge and their categories.
//!
//! Every allowed extension maps to exactly one [`Format`], and every format
//! belongs to exactly one [`Category`]. Extensions are matched
//! case-insensitively and serialized in lowercase.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Allowed document extensions.
pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "docx", "doc", "odt", "txt"];

/// Allowed image extensions.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tiff", "webp"];

/// Broad classification of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Office documents, PDFs and plain text.
    Document,
    /// Raster images.
    Image,
}

impl Category {
    /// Extensions belonging to this category.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Document => DOCUMENT_EXTENSIONS,
            Self::Image => IMAGE_EXTENSIONS,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document => write!(f, "document"),
            Self::Image => write!(f, "image"),
        }
    }
}

/// A concrete file format, one per allowed extension.
///
/// `Jpg` and `Jpeg` are kept apart so output files keep the extension the
/// client asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Pdf,
    Docx,
    Doc,
    Odt,
    Txt,
    Png,
    Jpg,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    Webp,
}

impl Format {
    /// All formats in declaration order.
    pub const ALL: &'static [Format] = &[
        Format::Pdf,
        Format::Docx,
        Format::Doc,
        Format::Odt,
        Format::Txt,
        Format::Png,
        Format::Jpg,
        Format::Jpeg,
        Format::Gif,
        Format::Bmp,
        Format::Tiff,
        Format::Webp,
    ];

    /// Parse an extension (without the dot), ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        Self::ALL.iter().copied().find(|f| f.extension() == ext)
    }

    /// Parse the extension after the last `.` of a filename.
    ///
    /// Names without a dot have no format.
    pub fn from_filename(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    /// Lowercase extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Doc => "doc",
            Self::Odt => "odt",
            Self::Txt => "txt",
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::Webp => "webp",
        }
    }

    /// Category this format belongs to.
    pub fn category(&self) -> Category {
        match self {
            Self::Pdf | Self::Docx | Self::Doc | Self::Odt | Self::Txt => Category::Document,
            _ => Category::Image,
        }
    }

    /// Whether this format is a JPEG variant.
    pub fn is_jpeg(&self) -> bool {
        matches!(self, Self::Jpg | Self::Jpeg)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
