//! docforge - upload, convert and download documents and images
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod server;
pub mod storage;
