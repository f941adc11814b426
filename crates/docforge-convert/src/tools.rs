//! External tool detection and management.
//!
//! The [`ToolRegistry`] discovers and caches the locations of the external
//! CLI tools docforge delegates to (LibreOffice and Ghostscript) and provides
//! lookup methods for the converters.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use docforge_common::config::ToolsConfig;
use serde::Serialize;

/// Headless LibreOffice, used for office document conversion.
pub const SOFFICE: &str = "soffice";

/// Ghostscript, used for PDF compression.
pub const GHOSTSCRIPT: &str = "gs";

/// Known tool names that the registry manages.
const KNOWN_TOOLS: &[&str] = &[SOFFICE, GHOSTSCRIPT];

/// A discovered external tool.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Tool name (e.g. "soffice").
    pub name: String,
    /// Resolved path to the executable.
    pub path: PathBuf,
    /// Maximum execution time before the tool is killed.
    pub timeout: Duration,
}

/// Availability information for a tool, returned by [`ToolRegistry::check_all`].
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    /// Tool name.
    pub name: String,
    /// Whether the tool was found.
    pub available: bool,
    /// Version string (first line of `--version` output), if available.
    pub version: Option<String>,
    /// Resolved path to the executable.
    pub path: Option<PathBuf>,
}

/// Registry holding discovered tool configurations.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolConfig>,
}

impl ToolRegistry {
    /// Discover tools by searching `PATH` (or using overrides from config).
    ///
    /// For each known tool, a configured path is used directly if it exists.
    /// Otherwise [`which::which`] locates the tool in `PATH`. Tools that are
    /// not found are omitted from the registry.
    pub fn discover(tools_config: &ToolsConfig) -> Self {
        let timeout = Duration::from_secs(tools_config.timeout_secs);
        let mut tools = HashMap::new();

        for &name in KNOWN_TOOLS {
            let custom_path = match name {
                SOFFICE => tools_config.soffice_path.as_deref(),
                GHOSTSCRIPT => tools_config.gs_path.as_deref(),
                _ => None,
            };

            let resolved = match custom_path {
                Some(p) if p.exists() => Some(p.to_path_buf()),
                Some(p) => {
                    tracing::warn!(
                        "Configured path for {name} does not exist: {}; searching PATH",
                        p.display()
                    );
                    which::which(name).ok()
                }
                None => which::which(name).ok(),
            };

            if let Some(path) = resolved {
                tools.insert(
                    name.to_string(),
                    ToolConfig {
                        name: name.to_string(),
                        path,
                        timeout,
                    },
                );
            }
        }

        Self { tools }
    }

    /// A registry with no tools, so every conversion takes its tool-free path.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Return the [`ToolConfig`] for the given tool, or an [`Error::Tool`]
    /// if the tool was not found during discovery.
    ///
    /// [`Error::Tool`]: docforge_common::Error::Tool
    pub fn require(&self, name: &str) -> docforge_common::Result<&ToolConfig> {
        self.tools.get(name).ok_or_else(|| {
            let message = format!("{name} not found; is it installed and in PATH?");
            docforge_common::Error::tool(name, message)
        })
    }

    /// Whether the tool was found during discovery.
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Check all known tools and return availability information.
    pub fn check_all(&self) -> Vec<ToolInfo> {
        KNOWN_TOOLS
            .iter()
            .map(|&name| match self.tools.get(name) {
                Some(cfg) => ToolInfo {
                    name: name.to_string(),
                    available: true,
                    version: detect_version(&cfg.path),
                    path: Some(cfg.path.clone()),
                },
                None => ToolInfo {
                    name: name.to_string(),
                    available: false,
                    version: None,
                    path: None,
                },
            })
            .collect()
    }
}

/// Run `<tool> --version` and return the first non-empty line of stdout.
fn detect_version(path: &Path) -> Option<String> {
    let output = std::process::Command::new(path)
        .arg("--version")
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discover_with_default_config() {
        let registry = ToolRegistry::discover(&ToolsConfig::default());
        // Nothing guarantees the tools are installed, but discovery must not panic.
        let _ = registry.check_all();
    }

    #[test]
    fn require_missing_tool_returns_error() {
        let registry = ToolRegistry::empty();
        let err = registry.require(SOFFICE).unwrap_err();
        assert!(err.to_string().contains("soffice not found"));
        assert!(!registry.has(GHOSTSCRIPT));
    }

    #[test]
    fn check_all_reports_every_known_tool() {
        let infos = ToolRegistry::empty().check_all();
        let names: Vec<&str> = infos.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["soffice", "gs"]);
        assert!(infos.iter().all(|i| !i.available && i.path.is_none()));
    }

    #[test]
    fn configured_path_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let fake_gs = dir.path().join("my-gs");
        std::fs::write(&fake_gs, b"#!/bin/sh\n").unwrap();

        let cfg = ToolsConfig {
            gs_path: Some(fake_gs.clone()),
            timeout_secs: 7,
            ..ToolsConfig::default()
        };
        let registry = ToolRegistry::discover(&cfg);
        let gs = registry.require(GHOSTSCRIPT).unwrap();
        assert_eq!(gs.path, fake_gs);
        assert_eq!(gs.timeout, Duration::from_secs(7));
    }
}
