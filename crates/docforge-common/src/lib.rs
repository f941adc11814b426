//! docforge-common: shared types, errors, and filename utilities.
//!
//! This crate is the foundational dependency for the other docforge crates:
//!
//! - **Error handling**: a unified [`Error`] that maps onto HTTP status codes
//! - **Formats**: the allowed extensions and their [`Category`]
//! - **Names**: client filename sanitising and allow-listing
//! - **Config**: tool and compression settings shared by the converter and
//!   the server configuration
//!
//! # Examples
//!
//! ```
//! use docforge_common::{names, Category, Format};
//!
//! assert!(names::allowed_file("report.PDF"));
//! assert_eq!(names::file_category("photo.jpeg"), Some(Category::Image));
//! assert_eq!(Format::from_extension("Docx"), Some(Format::Docx));
//! assert_eq!(names::secure_filename("../../etc/passwd"), "etc_passwd");
//! ```

pub mod config;
pub mod error;
pub mod formats;
pub mod names;

pub use error::{Error, Result};
pub use formats::{Category, Format};
