use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthDto {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses((status = 200, description = "Server is running", body = HealthDto))
)]
pub async fn health_check() -> Json<HealthDto> {
    Json(HealthDto {
        status: "OK",
        message: "Emergency Alert System API is running",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn route_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found" })),
    )
        .into_response()
}

/// Serve a pre-rendered OpenAPI document.
pub fn openapi_response(doc: &serde_json::Value) -> Response {
    (
        [(header::CACHE_CONTROL, "no-store")],
        Json(doc.clone()),
    )
        .into_response()
}

pub async fn serve_docs() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>SOS API Docs</title>
  <script src="https://unpkg.com/@stoplight/elements@latest/web-components.min.js"></script>
  <link rel="stylesheet" href="https://unpkg.com/@stoplight/elements@latest/styles.min.css">
</head>
<body>
  <elements-api apiDescriptionUrl="/api/openapi.json" router="hash" layout="sidebar"></elements-api>
</body>
</html>"#,
    )
}
