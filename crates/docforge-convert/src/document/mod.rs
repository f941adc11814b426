//! Document conversion.
//!
//! A pair is resolved through the [`dispatch`](crate::dispatch) table and
//! carried out by soffice, by the text rebuild, or by soffice with the text
//! rebuild as fallback.

pub mod office;
pub mod package;
pub mod text;

use std::path::{Path, PathBuf};

use docforge_common::{Error, Format, Result};

use crate::dispatch::{self, Strategy};
use crate::tools::{ToolRegistry, SOFFICE};
use crate::workspace::{output_file_name, Workspace};

/// Convert a document from `source` to `target`, writing
/// `{out_dir}/{stem}.{target}`.
pub async fn convert_document(
    tools: &ToolRegistry,
    input: &Path,
    source: Format,
    target: Format,
    out_dir: &Path,
) -> Result<PathBuf> {
    let strategy = dispatch::resolve(source, target)?;
    let ws = Workspace::new(input)?;

    tracing::debug!(
        "document {} ({source} -> {target}) via {strategy:?}",
        input.display()
    );

    let produced = match strategy {
        Strategy::Office => match office::convert_with_office(tools, &ws, source, target).await {
            Ok(path) => path,
            Err(_) if !tools.has(SOFFICE) => {
                return Err(Error::Conversion(format!(
                    "{} conversion requires LibreOffice installed",
                    target.extension().to_uppercase()
                )));
            }
            Err(e) => return Err(e),
        },
        Strategy::OfficeOrText => {
            match office::convert_with_office(tools, &ws, source, target).await {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!(
                        "soffice unavailable for {source} -> {target} ({e}), rebuilding from text"
                    );
                    rebuild_from_text(&ws, source, target).await?
                }
            }
        }
        Strategy::Text => rebuild_from_text(&ws, source, target).await?,
    };

    let dest = out_dir.join(output_file_name(input, "", target.extension()));
    ws.finalize(&produced, &dest)
}

/// Extract the text of the workspace input and write it in the target
/// container inside the workspace.
async fn rebuild_from_text(ws: &Workspace, source: Format, target: Format) -> Result<PathBuf> {
    let input = ws.input().to_path_buf();
    let produced = ws.output_with_extension(target.extension());

    tokio::task::spawn_blocking(move || {
        let text = text::extract_text(&input, source)?;
        package::write_text_as(&produced, target, &text)?;
        Ok(produced)
    })
    .await
    .map_err(|e| Error::Internal(format!("text conversion task failed: {e}")))?
}
