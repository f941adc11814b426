//! Upload, convert and download endpoints.

use axum::{
    body::Body,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Multipart, Path, State,
    },
    http::{header, StatusCode},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use docforge_common::names::secure_filename;
use docforge_common::{Category, Error, Result};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;
use utoipa::ToSchema;

use super::error::AppError;
use super::openapi::ErrorBodySchema;
use super::request_id::RequestId;
use super::AppContext;

pub fn file_routes() -> Router<AppContext> {
    Router::new()
        .route("/upload", post(upload))
        .route("/convert", post(convert))
        .route("/download/:filename", get(download))
}

/// Multipart form accepted by `/upload`.
#[derive(ToSchema)]
pub struct UploadForm {
    /// The file to store.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    /// Sanitised name to pass to `/convert`.
    pub filename: String,
    #[schema(value_type = super::openapi::CategorySchema)]
    pub file_category: Category,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ConvertRequest {
    /// Name returned by `/upload`.
    pub filename: Option<String>,
    /// Target extension, e.g. `pdf` or `png`.
    pub target_format: Option<String>,
    /// Compress the converted file.
    #[serde(default)]
    pub compress: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConvertResponse {
    pub message: String,
    pub download_url: String,
    pub filename: String,
}

fn multipart_error(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge(e.body_text())
    } else {
        Error::Validation(format!("Invalid upload: {}", e.body_text()))
    }
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "files",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "No file, empty name, or disallowed extension",
            body = ErrorBodySchema),
        (status = 413, description = "Upload exceeds the size limit", body = ErrorBodySchema)
    )
)]
pub async fn upload(
    State(ctx): State<AppContext>,
    rid: RequestId,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> std::result::Result<Json<UploadResponse>, AppError> {
    handle_upload(&ctx, multipart)
        .await
        .map(Json)
        .map_err(|e| AppError::new(e).with_request_id(rid.0))
}

async fn handle_upload(
    ctx: &AppContext,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<UploadResponse> {
    let mut multipart = multipart.map_err(|_| Error::Validation("No file part".into()))?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let name = field.file_name().unwrap_or_default().to_string();
        if name.is_empty() {
            return Err(Error::Validation("No selected file".into()));
        }

        let _lease = ctx
            .leases
            .acquire(ctx.store.upload_dir().join(secure_filename(&name)));
        let bytes = field.bytes().await.map_err(multipart_error)?;
        let stored = ctx.store.save_upload(&name, &bytes).await?;

        return Ok(UploadResponse {
            message: "File uploaded successfully".into(),
            filename: stored.filename,
            file_category: stored.category,
        });
    }

    Err(Error::Validation("No file part".into()))
}

#[utoipa::path(
    post,
    path = "/convert",
    tag = "files",
    request_body = ConvertRequest,
    responses(
        (status = 200, description = "File converted", body = ConvertResponse),
        (status = 400, description = "Missing parameters or unsupported conversion",
            body = ErrorBodySchema),
        (status = 404, description = "Upload not found", body = ErrorBodySchema),
        (status = 500, description = "Conversion failed", body = ErrorBodySchema)
    )
)]
pub async fn convert(
    State(ctx): State<AppContext>,
    rid: RequestId,
    payload: std::result::Result<Json<ConvertRequest>, JsonRejection>,
) -> std::result::Result<Json<ConvertResponse>, AppError> {
    handle_convert(&ctx, payload)
        .await
        .map(Json)
        .map_err(|e| AppError::new(e).with_request_id(rid.0))
}

async fn handle_convert(
    ctx: &AppContext,
    payload: std::result::Result<Json<ConvertRequest>, JsonRejection>,
) -> Result<ConvertResponse> {
    let Json(req) = payload.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Error::PayloadTooLarge(e.body_text())
        } else {
            Error::Validation(format!("Invalid request body: {}", e.body_text()))
        }
    })?;

    let non_empty = |s: Option<String>| s.filter(|v| !v.trim().is_empty());
    let (Some(filename), Some(target)) = (non_empty(req.filename), non_empty(req.target_format))
    else {
        return Err(Error::Validation("Missing parameters".into()));
    };

    let (input, _input_lease) = ctx.store.lease_upload(&ctx.leases, &filename)?;
    let out_dir = ctx.store.processed_dir();

    let converted = ctx
        .converter
        .convert(&input, target.trim(), out_dir)
        .await
        .map_err(Error::into_conversion)?;
    let _output_lease = ctx.leases.acquire(converted.clone());

    let result = if req.compress {
        ctx.converter
            .compress(&converted, out_dir)
            .await
            .map_err(Error::into_conversion)?
    } else {
        converted
    };

    let name = result
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::Internal("converted file has no name".into()))?;

    tracing::info!("Converted {} -> {}", filename, name);

    Ok(ConvertResponse {
        message: "File converted successfully".into(),
        download_url: format!("/download/{name}"),
        filename: name,
    })
}

#[utoipa::path(
    get,
    path = "/download/{filename}",
    tag = "files",
    params(
        ("filename" = String, Path, description = "Name returned by /convert")
    ),
    responses(
        (status = 200, description = "File contents as an attachment",
            content_type = "application/octet-stream"),
        (status = 404, description = "File not found", body = ErrorBodySchema)
    )
)]
pub async fn download(
    State(ctx): State<AppContext>,
    rid: RequestId,
    Path(filename): Path<String>,
) -> std::result::Result<Response, AppError> {
    handle_download(&ctx, &filename)
        .await
        .map_err(|e| AppError::new(e).with_request_id(rid.0))
}

async fn handle_download(ctx: &AppContext, filename: &str) -> Result<Response> {
    let path = ctx.store.processed_path(filename)?;

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::not_found("File", filename));
        }
        Err(e) => return Err(e.into()),
    };
    let len = file.metadata().await?.len();
    let mime = mime_guess::from_path(&path).first_or_octet_stream();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CONTENT_LENGTH, len)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| Error::Internal(format!("failed to build response: {e}")))
}
