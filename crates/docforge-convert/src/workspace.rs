//! Per-conversion scratch space.
//!
//! A [`Workspace`] is a private temporary directory that tools write their
//! output into. Once a step has produced its file, [`Workspace::finalize`]
//! moves it into the shared output directory, so concurrent conversions of
//! same-named inputs never see each other's partial files.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory for one conversion or compression step.
///
/// # Example
///
/// ```no_run
/// use docforge_convert::Workspace;
/// use std::path::Path;
///
/// let ws = Workspace::new(Path::new("/uploads/letter.docx")).unwrap();
/// let produced = ws.output_with_extension("pdf");
/// // ... run a tool that writes `produced` ...
/// let final_path = ws.finalize(&produced, Path::new("/processed/letter.pdf")).unwrap();
/// ```
pub struct Workspace {
    temp_dir: TempDir,
    input_path: PathBuf,
}

impl Workspace {
    /// Create a new workspace for processing a file.
    pub fn new(input: &Path) -> docforge_common::Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix("docforge-")
            .tempdir()
            .map_err(|e| {
                docforge_common::Error::Internal(format!("failed to create temp dir: {e}"))
            })?;

        Ok(Self {
            temp_dir,
            input_path: input.to_path_buf(),
        })
    }

    /// The original input file path.
    pub fn input(&self) -> &Path {
        &self.input_path
    }

    /// Path to the temporary directory.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a path for a named temporary file inside the workspace.
    pub fn temp_file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Path inside the workspace with the input's stem and the given extension.
    ///
    /// This is where `soffice --outdir` places its result.
    pub fn output_with_extension(&self, ext: &str) -> PathBuf {
        let stem = self
            .input_path
            .file_stem()
            .unwrap_or_else(|| std::ffi::OsStr::new("output"));
        let mut name = stem.to_os_string();
        name.push(".");
        name.push(ext);
        self.temp_dir.path().join(name)
    }

    /// Move `produced` (a file inside this workspace) to `dest`.
    ///
    /// An existing file at `dest` is replaced. Rename is tried first and a
    /// copy is used when the workspace lives on another filesystem. The
    /// temporary directory is removed when the workspace is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if `produced` does not exist or the move fails.
    pub fn finalize(self, produced: &Path, dest: &Path) -> docforge_common::Result<PathBuf> {
        if !produced.exists() {
            return Err(docforge_common::Error::Internal(format!(
                "output file does not exist: {}",
                produced.display()
            )));
        }

        if std::fs::rename(produced, dest).is_err() {
            std::fs::copy(produced, dest)?;
            let _ = std::fs::remove_file(produced);
        }

        Ok(dest.to_path_buf())
    }
}

/// File name for a result derived from `input`: `{stem}{suffix}.{ext}`.
pub fn output_file_name(input: &Path, suffix: &str, ext: &str) -> String {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let (stem, _) = docforge_common::names::split_name(&name);
    format!("{stem}{suffix}.{ext}")
}
