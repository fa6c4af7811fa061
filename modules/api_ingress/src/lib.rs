//! HTTP ingress: mounts every REST module on one router, wraps it in the
//! shared middleware stack, publishes a merged OpenAPI document and serves it.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use axum::{middleware::from_fn, routing::get, Router};
use modkit::RestfulModule;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::openapi::{InfoBuilder, OpenApiBuilder};
use utoipa::OpenApi;

mod config;
pub mod request_id;
pub mod web;

pub use config::ApiIngressConfig;

#[derive(OpenApi)]
#[openapi(
    paths(web::health_check),
    components(schemas(web::HealthDto)),
    tags((name = "health", description = "Liveness"))
)]
struct IngressDoc;

/// Owns the HTTP server and the set of mounted modules.
pub struct ApiIngress {
    config: ApiIngressConfig,
    modules: Vec<Arc<dyn RestfulModule>>,
}

impl ApiIngress {
    pub const NAME: &'static str = "api_ingress";

    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config,
            modules: Vec::new(),
        }
    }

    pub fn config(&self) -> &ApiIngressConfig {
        &self.config
    }

    /// Mount a module. A second module with the same name is ignored.
    pub fn register(&mut self, module: Arc<dyn RestfulModule>) {
        if self.modules.iter().any(|m| m.name() == module.name()) {
            tracing::error!(
                module = module.name(),
                "Duplicate module registration detected; ignoring subsequent registration"
            );
            return;
        }
        tracing::debug!(module = module.name(), "Registered REST module");
        self.modules.push(module);
    }

    /// Merged document of the ingress's own routes and every mounted module.
    pub fn build_openapi(&self) -> utoipa::openapi::OpenApi {
        let mut doc = OpenApiBuilder::new()
            .info(
                InfoBuilder::new()
                    .title("SOS Emergency API")
                    .version(env!("CARGO_PKG_VERSION"))
                    .description(Some(
                        "Emergency request intake, operator triage and live notifications",
                    ))
                    .build(),
            )
            .build();
        doc.merge(IngressDoc::openapi());
        for module in &self.modules {
            doc.merge(module.openapi());
        }

        doc.components.get_or_insert_with(Default::default).add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );

        tracing::info!("Building OpenAPI: found {} paths", doc.paths.paths.len());
        doc
    }

    /// Build the HTTP router from the mounted modules.
    pub fn build_router(&self) -> Result<Router> {
        let mut router = Router::new().route("/api/health", get(web::health_check));

        for module in &self.modules {
            router = module
                .register_rest(router)
                .with_context(|| format!("failed to register routes of {}", module.name()))?;
        }

        if self.config.enable_docs {
            let doc = serde_json::to_value(self.build_openapi())
                .context("failed to render OpenAPI document")?;
            let doc = Arc::new(doc);
            router = router
                .route(
                    "/api/openapi.json",
                    get(move || {
                        let doc = doc.clone();
                        async move { web::openapi_response(&doc) }
                    }),
                )
                .route("/api/docs", get(web::serve_docs));
        }

        // The fallback must exist before layering so unknown routes get the same stack.
        router = router.fallback(web::route_not_found);

        // Each `.layer` wraps the previous ones; listed from innermost to outermost:
        // BodyLimit -> CORS -> Timeout -> Trace -> push_req_id -> PropagateRequestId -> SetRequestId
        router = router.layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));

        if let Some(cors) = self.cors_layer()? {
            router = router.layer(cors);
        }

        router = router.layer(TimeoutLayer::new(Duration::from_secs(
            self.config.request_timeout_secs.max(1),
        )));

        router = router.layer(
            TraceLayer::new_for_http()
                .make_span_with(request_id::make_span)
                .on_response(request_id::record_response),
        );

        router = router.layer(from_fn(request_id::push_req_id_to_extensions));

        let x_request_id = request_id::header();
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router = router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId));

        Ok(router)
    }

    fn cors_layer(&self) -> Result<Option<CorsLayer>> {
        if !self.config.cors_enabled {
            return Ok(None);
        }
        if self.config.cors_origins.is_empty() {
            return Ok(Some(CorsLayer::permissive()));
        }
        let origins = self
            .config
            .cors_origins
            .iter()
            .map(|o| {
                HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin '{o}'"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(
            CorsLayer::permissive().allow_origin(AllowOrigin::list(origins)),
        ))
    }

    /// Bind, serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn serve<F>(&self, bind_addr: &str, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = bind_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", bind_addr, e))?;
        let router = self.build_router()?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        tracing::info!("HTTP server bound on {}", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("HTTP server shutting down gracefully");
            })
            .await
            .context("HTTP server failed")
    }
}
