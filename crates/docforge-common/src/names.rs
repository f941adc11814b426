//! Filename helpers: sanitising client-supplied names and allow-listing them
//! by extension.

use unicode_normalization::UnicodeNormalization;

use crate::formats::{Category, Format};

/// Reduce a client-supplied filename to a safe, flat ASCII name.
///
/// The name is NFKD-normalised first so accented letters keep their base
/// letter. Path separators become word breaks, whitespace runs become `_`, anything
/// outside `[A-Za-z0-9_.-]` is dropped, and leading/trailing `.` and `_` are
/// trimmed. The result never contains a path separator and may be empty.
///
/// # Examples
///
/// ```
/// use docforge_common::names::secure_filename;
///
/// assert_eq!(secure_filename("My cool report.pdf"), "My_cool_report.pdf");
/// assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
/// assert_eq!(secure_filename("Résumé.pdf"), "Resume.pdf");
/// assert_eq!(secure_filename("..."), "");
/// ```
pub fn secure_filename(name: &str) -> String {
    let flattened: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Whether `name` has an extension from the allowed set.
pub fn allowed_file(name: &str) -> bool {
    Format::from_filename(name).is_some()
}

/// Category of `name` derived from its extension, if allowed.
pub fn file_category(name: &str) -> Option<Category> {
    Format::from_filename(name).map(|f| f.category())
}

/// Split a filename into stem and extension at the last `.`.
///
/// A leading dot does not start an extension, matching the usual
/// `splitext` behaviour for dotfiles.
pub fn split_name(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    }
}
