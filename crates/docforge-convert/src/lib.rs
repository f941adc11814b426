//! docforge-convert: document and image conversion.
//!
//! Office formats are converted by headless LibreOffice (`soffice`) when it
//! is installed, with a tool-free text path for the pairs that allow it.
//! Images are handled natively by the `image` crate and PDFs are compressed
//! with Ghostscript (`gs`).
//!
//! - [`tools`]: discovery of `soffice` and `gs`
//! - [`command`]: subprocess builder with timeouts
//! - [`workspace`]: per-conversion temp directories
//! - [`dispatch`]: the document conversion table
//! - [`document`], [`raster`], [`compress`]: the conversions themselves
//! - [`Converter`]: the facade the server and CLI use

pub mod command;
pub mod compress;
pub mod converter;
pub mod dispatch;
pub mod document;
pub mod raster;
pub mod tools;
pub mod workspace;

pub use command::{ToolCommand, ToolOutput};
pub use converter::Converter;
pub use dispatch::{ConversionPair, Strategy};
pub use tools::{ToolInfo, ToolRegistry};
pub use workspace::Workspace;
