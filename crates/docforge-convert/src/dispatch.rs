//! The document conversion table.
//!
//! Each supported `(source, target)` pair maps to a [`Strategy`]. Pairs that
//! are not listed, including same-format pairs, are rejected.

use docforge_common::{Error, Format, Result};
use serde::Serialize;

/// How a document conversion pair is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Headless LibreOffice only. Missing or failing soffice is an error.
    Office,
    /// Headless LibreOffice, falling back to [`Strategy::Text`] when soffice
    /// is missing or fails.
    OfficeOrText,
    /// Extract plain text from the source and rebuild the target around it.
    Text,
}

/// A declared conversion pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConversionPair {
    pub source: Format,
    pub target: Format,
    pub strategy: Strategy,
}

const fn pair(source: Format, target: Format, strategy: Strategy) -> ConversionPair {
    ConversionPair {
        source,
        target,
        strategy,
    }
}

static PAIRS: &[ConversionPair] = &[
    pair(Format::Pdf, Format::Docx, Strategy::Text),
    pair(Format::Pdf, Format::Odt, Strategy::OfficeOrText),
    pair(Format::Pdf, Format::Txt, Strategy::Text),
    pair(Format::Docx, Format::Pdf, Strategy::Office),
    pair(Format::Docx, Format::Odt, Strategy::OfficeOrText),
    pair(Format::Docx, Format::Txt, Strategy::Text),
    pair(Format::Odt, Format::Pdf, Strategy::Office),
    pair(Format::Odt, Format::Docx, Strategy::OfficeOrText),
    pair(Format::Odt, Format::Txt, Strategy::Text),
    pair(Format::Txt, Format::Pdf, Strategy::Office),
    pair(Format::Txt, Format::Docx, Strategy::Text),
    pair(Format::Txt, Format::Odt, Strategy::Text),
    pair(Format::Doc, Format::Pdf, Strategy::Office),
    pair(Format::Doc, Format::Docx, Strategy::OfficeOrText),
    pair(Format::Doc, Format::Odt, Strategy::OfficeOrText),
    pair(Format::Doc, Format::Txt, Strategy::OfficeOrText),
];

/// All declared document conversion pairs.
pub fn pairs() -> &'static [ConversionPair] {
    PAIRS
}

/// Strategy for a pair, or `None` if the pair is not declared.
pub fn lookup(source: Format, target: Format) -> Option<Strategy> {
    PAIRS
        .iter()
        .find(|p| p.source == source && p.target == target)
        .map(|p| p.strategy)
}

/// Like [`lookup`] but returns [`Error::Unsupported`] for undeclared pairs.
pub fn resolve(source: Format, target: Format) -> Result<Strategy> {
    lookup(source, target).ok_or_else(|| Error::unsupported_pair(source, target))
}
