//! Headless LibreOffice conversion.

use std::path::PathBuf;

use docforge_common::{Error, Format, Result};

use crate::command::ToolCommand;
use crate::tools::{ToolRegistry, SOFFICE};
use crate::workspace::Workspace;

/// The `--convert-to` argument for a target format.
fn convert_to_arg(target: Format) -> &'static str {
    match target {
        Format::Txt => "txt:Text (encoded):UTF8",
        other => other.extension(),
    }
}

/// Convert the workspace input with soffice and return the produced file.
///
/// Each invocation gets its own LibreOffice profile inside the workspace so
/// that concurrent conversions do not fight over the user installation lock.
pub async fn convert_with_office(
    tools: &ToolRegistry,
    ws: &Workspace,
    source: Format,
    target: Format,
) -> Result<PathBuf> {
    let soffice = tools.require(SOFFICE)?;
    let profile = ws.temp_file("lo-profile");

    let mut cmd = ToolCommand::new(soffice.path.clone());
    cmd.arg(format!("-env:UserInstallation=file://{}", profile.display()))
        .arg("--headless");
    if source == Format::Pdf {
        cmd.arg("--infilter=writer_pdf_import");
    }
    cmd.args(["--convert-to", convert_to_arg(target)])
        .arg("--outdir")
        .arg(ws.temp_dir().to_string_lossy())
        .arg(ws.input().to_string_lossy())
        .current_dir(ws.temp_dir())
        .timeout(soffice.timeout);

    cmd.execute().await?;

    // soffice exits 0 even when the filter refuses the document.
    let produced = ws.output_with_extension(target.extension());
    if !produced.exists() {
        return Err(Error::tool(
            SOFFICE,
            format!("no {target} output produced for {}", ws.input().display()),
        ));
    }

    Ok(produced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn txt_target_uses_utf8_filter() {
        assert_eq!(convert_to_arg(Format::Txt), "txt:Text (encoded):UTF8");
        assert_eq!(convert_to_arg(Format::Pdf), "pdf");
        assert_eq!(convert_to_arg(Format::Docx), "docx");
    }

    #[tokio::test]
    async fn missing_soffice_is_a_tool_error() {
        let ws = Workspace::new(Path::new("letter.docx")).unwrap();
        let err = convert_with_office(&ToolRegistry::empty(), &ws, Format::Docx, Format::Pdf)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Tool { ref tool, .. } if tool == SOFFICE));
    }
}
