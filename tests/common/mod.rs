//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which owns a temporary storage root and a full
//! [`AppContext`] built with an empty tool registry, so every conversion takes
//! its tool-free path. [`TestHarness::with_server`] starts Axum on a random
//! port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use docforge::config::Config;
use docforge::server::{create_router, AppContext};
use docforge_convert::ToolRegistry;
use tempfile::TempDir;

pub struct TestHarness {
    pub ctx: AppContext,
    pub root: TempDir,
}

impl TestHarness {
    /// Create a new harness with default configuration in a fresh temp dir.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a harness, letting the caller adjust the config first.
    /// Storage directories always point into the harness's temp dir.
    pub fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let root = tempfile::tempdir().expect("failed to create temp dir");
        let mut config = Config::default();
        config.storage.upload_dir = root.path().join("uploads/temp");
        config.storage.processed_dir = root.path().join("uploads/processed");
        config.storage.sweep_interval_secs = 0;
        adjust(&mut config);

        let ctx = AppContext::new(config, ToolRegistry::empty());
        ctx.store.ensure_dirs().expect("failed to create storage dirs");

        Self { ctx, root }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::new().serve().await
    }

    /// Start an Axum server with an adjusted config on a random port.
    pub async fn with_server_config(adjust: impl FnOnce(&mut Config)) -> (Self, SocketAddr) {
        Self::with_config(adjust).serve().await
    }

    async fn serve(self) -> (Self, SocketAddr) {
        let app = create_router(self.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (self, addr)
    }

    pub fn upload_dir(&self) -> &Path {
        self.ctx.store.upload_dir()
    }

    pub fn processed_dir(&self) -> &Path {
        self.ctx.store.processed_dir()
    }

    /// Put a file straight into the upload directory.
    pub fn seed_upload(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.upload_dir().join(name);
        std::fs::write(&path, bytes).expect("failed to seed upload");
        path
    }
}

/// Upload `bytes` as `name` through the HTTP API.
pub async fn upload(addr: SocketAddr, name: &str, bytes: Vec<u8>) -> reqwest::Response {
    let part = reqwest::multipart::Part::bytes(bytes).file_name(name.to_string());
    let form = reqwest::multipart::Form::new().part("file", part);
    reqwest::Client::new()
        .post(format!("http://{addr}/upload"))
        .multipart(form)
        .send()
        .await
        .expect("upload request failed")
}

/// POST a JSON body to `/convert`.
pub async fn convert(addr: SocketAddr, body: serde_json::Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("http://{addr}/convert"))
        .json(&body)
        .send()
        .await
        .expect("convert request failed")
}

/// A small PNG with an alpha channel.
pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(12, 8, image::Rgba([20, 120, 220, 200]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("failed to encode png");
    out.into_inner()
}

/// A PDF with one line of text per page, in order.
pub fn pdf_bytes(pages: &[&str]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let kids: Vec<Object> = pages
        .iter()
        .map(|text| {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let stream = Stream::new(dictionary! {}, content.encode().expect("encode content"));
            let content_id = doc.add_object(stream);
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            })
            .into()
        })
        .collect();

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).expect("failed to write pdf");
    out
}
