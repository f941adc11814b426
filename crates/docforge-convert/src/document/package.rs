//! Minimal DOCX and ODT writers.
//!
//! Each line of the input text becomes one paragraph. The packages carry only
//! the parts a word processor needs to open them.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use docforge_common::{Error, Format, Result};
use zip::write::FileOptions;
use zip::CompressionMethod;

const ODT_MIMETYPE: &str = "application/vnd.oasis.opendocument.text";

const DOCX_CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const DOCX_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const ODT_MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="1.2"><manifest:file-entry manifest:full-path="/" manifest:version="1.2" manifest:media-type="application/vnd.oasis.opendocument.text"/><manifest:file-entry manifest:full-path="content.xml" manifest:media-type="text/xml"/></manifest:manifest>"#;

/// Write `text` to `path` in the given text-bearing format.
pub fn write_text_as(path: &Path, target: Format, text: &str) -> Result<()> {
    match target {
        Format::Txt => Ok(std::fs::write(path, text)?),
        Format::Docx => write_docx(path, text),
        Format::Odt => write_odt(path, text),
        other => Err(Error::Unsupported(format!(
            "cannot build {other} from plain text"
        ))),
    }
}

/// Write a DOCX package with one paragraph per line.
pub fn write_docx(path: &Path, text: &str) -> Result<()> {
    let mut body = String::with_capacity(text.len() + 128);
    for line in text.lines() {
        if line.is_empty() {
            body.push_str("<w:p/>");
        } else {
            body.push_str(r#"<w:p><w:r><w:t xml:space="preserve">"#);
            body.push_str(&escape_xml(line));
            body.push_str("</w:t></w:r></w:p>");
        }
    }

    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr/></w:body></w:document>"#
    );

    let deflated = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = zip::ZipWriter::new(File::create(path)?);

    zip.start_file("[Content_Types].xml", deflated).map_err(package_error)?;
    zip.write_all(DOCX_CONTENT_TYPES.as_bytes())?;
    zip.start_file("_rels/.rels", deflated).map_err(package_error)?;
    zip.write_all(DOCX_RELS.as_bytes())?;
    zip.start_file("word/document.xml", deflated).map_err(package_error)?;
    zip.write_all(document.as_bytes())?;

    zip.finish().map_err(package_error)?;
    Ok(())
}

/// Write an ODT package with one paragraph per line.
///
/// The `mimetype` entry comes first and is stored uncompressed, as ODF
/// requires.
pub fn write_odt(path: &Path, text: &str) -> Result<()> {
    let mut body = String::with_capacity(text.len() + 128);
    for line in text.lines() {
        if line.is_empty() {
            body.push_str("<text:p/>");
        } else {
            body.push_str("<text:p>");
            body.push_str(&escape_xml(line));
            body.push_str("</text:p>");
        }
    }

    let content = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" office:version="1.2"><office:body><office:text>{body}</office:text></office:body></office:document-content>"#
    );

    let stored = FileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = zip::ZipWriter::new(File::create(path)?);

    zip.start_file("mimetype", stored).map_err(package_error)?;
    zip.write_all(ODT_MIMETYPE.as_bytes())?;
    zip.start_file("META-INF/manifest.xml", deflated).map_err(package_error)?;
    zip.write_all(ODT_MANIFEST.as_bytes())?;
    zip.start_file("content.xml", deflated).map_err(package_error)?;
    zip.write_all(content.as_bytes())?;

    zip.finish().map_err(package_error)?;
    Ok(())
}

/// Escape text for XML character data. Characters XML 1.0 cannot carry are
/// dropped.
pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' => out.push(c),
            c if (c as u32) < 0x20 || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
            c => out.push(c),
        }
    }
    out
}

fn package_error(e: zip::result::ZipError) -> Error {
    Error::Conversion(format!("failed to write package: {e}"))
}
