//! Router assembly: module mounting, fallback, docs and middleware.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    routing::post,
    Json, Router,
};
use modkit::RestfulModule;
use serde_json::{json, Value};
use tower::ServiceExt;
use utoipa::OpenApi;

use api_ingress::{ApiIngress, ApiIngressConfig};

/// Echo back the posted JSON
#[utoipa::path(post, path = "/api/echo", tag = "echo", responses((status = 200, description = "Echoed")))]
async fn echo(Json(body): Json<Value>) -> Json<Value> {
    Json(body)
}

#[derive(OpenApi)]
#[openapi(paths(echo))]
struct EchoDoc;

struct EchoModule;

impl RestfulModule for EchoModule {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn register_rest(&self, router: Router) -> anyhow::Result<Router> {
        Ok(router.merge(Router::new().route("/api/echo", post(echo))))
    }

    fn openapi(&self) -> utoipa::openapi::OpenApi {
        EchoDoc::openapi()
    }
}

fn ingress(config: ApiIngressConfig) -> ApiIngress {
    let mut ingress = ApiIngress::new(config);
    ingress.register(Arc::new(EchoModule));
    ingress
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = ingress(ApiIngressConfig::default()).build_router().unwrap();
    let (status, headers, body) = send(&app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["message"], "Emergency Alert System API is running");
    assert!(body["timestamp"].is_string());
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let app = ingress(ApiIngressConfig::default()).build_router().unwrap();
    let (status, headers, body) = send(&app, get("/api/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Route not found" }));
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn module_routes_are_mounted() {
    let app = ingress(ApiIngressConfig::default()).build_router().unwrap();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/echo")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-request-id", "req-42")
        .body(Body::from(r#"{"hello":"world"}"#))
        .unwrap();
    let (status, headers, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "hello": "world" }));
    assert_eq!(headers.get("x-request-id").unwrap(), "req-42");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let app = ingress(ApiIngressConfig {
        body_limit_bytes: 16,
        ..ApiIngressConfig::default()
    })
    .build_router()
    .unwrap();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/echo")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "padding": "x".repeat(64) }).to_string()))
        .unwrap();
    let (status, _, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn openapi_merges_modules_and_declares_bearer() {
    let app = ingress(ApiIngressConfig::default()).build_router().unwrap();
    let (status, headers, doc) = send(&app, get("/api/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");
    assert!(doc["paths"]["/api/health"]["get"].is_object());
    assert!(doc["paths"]["/api/echo"]["post"].is_object());
    assert_eq!(doc["components"]["securitySchemes"]["bearer"]["scheme"], "bearer");
}

#[tokio::test]
async fn docs_can_be_disabled() {
    let app = ingress(ApiIngressConfig {
        enable_docs: false,
        ..ApiIngressConfig::default()
    })
    .build_router()
    .unwrap();
    let (status, _, _) = send(&app, get("/api/openapi.json")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cors_allow_list() {
    let app = ingress(ApiIngressConfig {
        cors_enabled: true,
        cors_origins: vec!["http://localhost:3000".to_string()],
        ..ApiIngressConfig::default()
    })
    .build_router()
    .unwrap();

    let preflight = |origin: &str| {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/echo")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    };

    let (_, headers, _) = send(&app, preflight("http://localhost:3000")).await;
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:3000"
    );

    let (_, headers, _) = send(&app, preflight("http://evil.example")).await;
    assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[test]
fn invalid_cors_origin_fails_the_build() {
    let res = ingress(ApiIngressConfig {
        cors_enabled: true,
        cors_origins: vec!["bad\norigin".to_string()],
        ..ApiIngressConfig::default()
    })
    .build_router();
    assert!(res.is_err());
}

#[test]
fn duplicate_modules_are_ignored() {
    let mut ingress = ingress(ApiIngressConfig::default());
    ingress.register(Arc::new(EchoModule));
    // A second mount of the same path would panic inside axum.
    assert!(ingress.build_router().is_ok());
}
