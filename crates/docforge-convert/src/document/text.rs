//! Plain-text extraction from document formats.
//!
//! This is the tool-free path of the conversion table: PDFs are read with
//! `lopdf`, DOCX and ODT packages are unzipped and their paragraph markup is
//! flattened to lines, legacy `.doc` files get a best-effort scan for
//! printable runs.

use std::io::Read;
use std::path::Path;

use docforge_common::{Error, Format, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Minimum length of a printable run kept from a binary `.doc` file.
const DOC_MIN_RUN: usize = 4;

static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|lt|gt|amp|quot|apos);").expect("entity regex")
});

static DOCX_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|</w:p>|<w:p/>|<w:p\s[^>]*/>|<w:tab/>|<w:br/>|<w:cr/>")
        .expect("docx token regex")
});

static ODT_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"(?P<empty><text:(?:p|h)(?:\s[^>]*)?/>)"#,
        r#"|(?P<open><text:(?:p|h)(?:\s[^>]*)?>)"#,
        r#"|(?P<close></text:(?:p|h)>)"#,
        r#"|(?P<space><text:s(?:\s+text:c="(?P<count>\d+)")?\s*/>)"#,
        r#"|(?P<tab><text:tab\s*/>)"#,
        r#"|(?P<br><text:line-break\s*/>)"#,
        r#"|<[^>]*>"#,
        r#"|(?P<text>[^<]+)"#,
    ))
    .expect("odt token regex")
});

/// Extract the plain text of a document.
///
/// Lines are separated by `\n`; paragraph boundaries become line breaks.
pub fn extract_text(path: &Path, format: Format) -> Result<String> {
    match format {
        Format::Pdf => extract_pdf(path),
        Format::Docx => extract_docx(path),
        Format::Odt => extract_odt(path),
        Format::Txt => Ok(String::from_utf8_lossy(&std::fs::read(path)?).into_owned()),
        Format::Doc => Ok(extract_printable_runs(&std::fs::read(path)?)),
        other => Err(Error::Unsupported(format!(
            "text extraction from {other} is not supported"
        ))),
    }
}

fn extract_pdf(path: &Path) -> Result<String> {
    let doc = lopdf::Document::load(path)
        .map_err(|e| Error::Conversion(format!("failed to read PDF: {e}")))?;

    let mut pages = Vec::new();
    for page_num in doc.get_pages().keys() {
        match doc.extract_text(&[*page_num]) {
            Ok(text) => pages.push(text.trim_end().to_string()),
            Err(e) => tracing::warn!("skipping PDF page {page_num} of {}: {e}", path.display()),
        }
    }

    Ok(pages.join("\n"))
}

fn read_zip_entry(path: &Path, entry: &str) -> Result<String> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| Error::Conversion(format!("{} is not a valid package: {e}", path.display())))?;
    let mut part = archive
        .by_name(entry)
        .map_err(|e| Error::Conversion(format!("{entry} missing from {}: {e}", path.display())))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(xml)
}

fn extract_docx(path: &Path) -> Result<String> {
    let xml = read_zip_entry(path, "word/document.xml")?;
    Ok(docx_xml_to_text(&xml))
}

fn extract_odt(path: &Path) -> Result<String> {
    let xml = read_zip_entry(path, "content.xml")?;
    Ok(odt_xml_to_text(&xml))
}

/// Flatten WordprocessingML body markup to lines.
pub(crate) fn docx_xml_to_text(xml: &str) -> String {
    let mut lines = Vec::new();
    let mut current = String::new();

    for caps in DOCX_TOKEN_RE.captures_iter(xml) {
        if let Some(text) = caps.get(1) {
            current.push_str(&decode_entities(text.as_str()));
            continue;
        }
        match &caps[0] {
            "<w:tab/>" => current.push('\t'),
            "<w:br/>" | "<w:cr/>" => current.push('\n'),
            _ => lines.push(std::mem::take(&mut current)),
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines.join("\n")
}

/// Flatten ODF `content.xml` to lines.
pub(crate) fn odt_xml_to_text(xml: &str) -> String {
    let body = match xml.find("<office:body") {
        Some(start) => &xml[start..],
        None => xml,
    };

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for caps in ODT_TOKEN_RE.captures_iter(body) {
        if let Some(text) = caps.name("text") {
            if depth > 0 {
                current.push_str(&decode_entities(text.as_str()));
            }
        } else if caps.name("open").is_some() {
            depth += 1;
        } else if caps.name("close").is_some() {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                lines.push(std::mem::take(&mut current));
            }
        } else if caps.name("empty").is_some() {
            if depth == 0 {
                lines.push(String::new());
            }
        } else if caps.name("space").is_some() {
            let count = caps
                .name("count")
                .and_then(|c| c.as_str().parse::<usize>().ok())
                .unwrap_or(1);
            current.extend(std::iter::repeat(' ').take(count));
        } else if caps.name("tab").is_some() {
            current.push('\t');
        } else if caps.name("br").is_some() {
            current.push('\n');
        }
    }

    lines.join("\n")
}

/// Keep runs of printable characters from a binary blob.
///
/// Word stores text pieces either as 8-bit or as UTF-16LE, so the blob is
/// scanned both ways (UTF-16 at both byte alignments) and the view with the
/// most text wins.
pub(crate) fn extract_printable_runs(bytes: &[u8]) -> String {
    let narrow = printable_runs(&String::from_utf8_lossy(bytes), |c| {
        (c.is_control() && c != '\t') || c == char::REPLACEMENT_CHARACTER
    });

    [0, 1]
        .into_iter()
        .filter(|&offset| bytes.len() > offset)
        .map(|offset| printable_runs(&utf16le_lossy(&bytes[offset..]), |c| !is_latin_text(c)))
        .fold(narrow, |best, wide| {
            if wide.chars().count() > best.chars().count() {
                wide
            } else {
                best
            }
        })
}

fn printable_runs(text: &str, is_break: impl Fn(char) -> bool) -> String {
    text.split(is_break)
        .map(str::trim)
        .filter(|run| run.chars().count() >= DOC_MIN_RUN)
        .collect::<Vec<_>>()
        .join("\n")
}

fn utf16le_lossy(bytes: &[u8]) -> String {
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Characters accepted in UTF-16 runs: printable ASCII, tab, and the Latin
/// supplements. Misaligned 8-bit text decodes to CJK code points, which
/// this rejects.
fn is_latin_text(c: char) -> bool {
    c == '\t' || c.is_ascii_graphic() || c == ' ' || ('\u{A0}'..='\u{24F}').contains(&c)
}

/// Decode the predefined XML entities and numeric character references.
pub(crate) fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    ENTITY_RE
        .replace_all(s, |caps: &regex::Captures| {
            let ent = &caps[1];
            match ent {
                "lt" => "<".to_string(),
                "gt" => ">".to_string(),
                "amp" => "&".to_string(),
                "quot" => "\"".to_string(),
                "apos" => "'".to_string(),
                _ => {
                    let code = if let Some(hex) = ent.strip_prefix("#x") {
                        u32::from_str_radix(hex, 16).ok()
                    } else {
                        ent[1..].parse::<u32>().ok()
                    };
                    code.and_then(char::from_u32)
                        .map(String::from)
                        .unwrap_or_else(|| caps[0].to_string())
                }
            }
        })
        .into_owned()
}
