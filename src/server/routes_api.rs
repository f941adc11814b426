use crate::server::AppContext;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use docforge_common::formats::{DOCUMENT_EXTENSIONS, IMAGE_EXTENSIONS};
use docforge_convert::dispatch;
use serde::Serialize;
use utoipa::ToSchema;

pub fn api_routes() -> Router<AppContext> {
    Router::new()
        .route("/tools", get(get_tools))
        .route("/formats", get(get_formats))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

#[derive(Serialize, ToSchema)]
pub struct ToolStatusResponse {
    pub name: String,
    pub available: bool,
    pub version: Option<String>,
    pub path: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/tools",
    tag = "tools",
    responses(
        (status = 200, description = "External tool availability", body = Vec<ToolStatusResponse>)
    )
)]
pub async fn get_tools(State(ctx): State<AppContext>) -> impl IntoResponse {
    let converter = ctx.converter.clone();
    // `--version` checks spawn processes; keep them off the async workers.
    let tools = tokio::task::spawn_blocking(move || converter.tools().check_all())
        .await
        .unwrap_or_default();

    let response: Vec<ToolStatusResponse> = tools
        .into_iter()
        .map(|t| ToolStatusResponse {
            name: t.name,
            available: t.available,
            version: t.version,
            path: t.path.map(|p| p.display().to_string()),
        })
        .collect();
    Json(response)
}

#[derive(Serialize, ToSchema)]
pub struct ConversionPairResponse {
    pub source: String,
    pub target: String,
    /// `office`, `office_or_text` or `text`.
    pub strategy: String,
}

#[derive(Serialize, ToSchema)]
pub struct FormatsResponse {
    pub document: Vec<String>,
    pub image: Vec<String>,
    /// Document pairs; any image converts to any other image format.
    pub conversions: Vec<ConversionPairResponse>,
}

#[utoipa::path(
    get,
    path = "/api/formats",
    tag = "formats",
    responses(
        (status = 200, description = "Allowed extensions and conversions", body = FormatsResponse)
    )
)]
pub async fn get_formats() -> impl IntoResponse {
    let conversions = dispatch::pairs()
        .iter()
        .map(|p| ConversionPairResponse {
            source: p.source.to_string(),
            target: p.target.to_string(),
            strategy: serde_json::to_value(p.strategy)
                .ok()
                .and_then(|v| v.as_str().map(String::from))
                .unwrap_or_default(),
        })
        .collect();

    Json(FormatsResponse {
        document: DOCUMENT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        image: IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        conversions,
    })
}
