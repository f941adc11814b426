//! OpenAPI documentation and Swagger UI integration.

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::AppContext;

/// OpenAPI documentation for docforge.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "docforge API",
        version = "0.1.0",
        description = "Upload documents and images, convert them between formats, \
                       and download the results",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    servers(
        (url = "/", description = "Default server")
    ),
    paths(
        super::routes_files::upload,
        super::routes_files::convert,
        super::routes_files::download,
        super::routes_api::health,
        super::routes_api::get_tools,
        super::routes_api::get_formats,
    ),
    components(
        schemas(
            super::routes_files::UploadForm,
            super::routes_files::UploadResponse,
            super::routes_files::ConvertRequest,
            super::routes_files::ConvertResponse,
            super::routes_api::ToolStatusResponse,
            super::routes_api::ConversionPairResponse,
            super::routes_api::FormatsResponse,
            CategorySchema,
            ErrorBodySchema,
        )
    ),
    tags(
        (name = "files", description = "Upload, conversion and download"),
        (name = "health", description = "Health check endpoints"),
        (name = "tools", description = "External tools status"),
        (name = "formats", description = "Supported formats"),
    )
)]
pub struct ApiDoc;

// Schema wrappers for types that can't derive ToSchema directly

/// File category.
#[derive(serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
#[schema(as = Category)]
pub enum CategorySchema {
    Document,
    Image,
}

/// Error body returned by every failing endpoint.
#[derive(utoipa::ToSchema)]
#[schema(as = ErrorBody)]
pub struct ErrorBodySchema {
    /// Human-readable message
    pub error: String,
    /// Machine-readable code, e.g. `not_found`
    pub code: String,
    /// Value of the `x-request-id` response header
    pub request_id: Option<String>,
}

/// Create OpenAPI documentation routes.
/// - `/api/docs` - Swagger UI
/// - `/api/openapi.json` - Raw OpenAPI JSON document (served by SwaggerUi)
pub fn openapi_routes() -> Router<AppContext> {
    Router::new().merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
}
