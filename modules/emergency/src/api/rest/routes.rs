use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Extension, Router,
};
use operators::AuthService;
use utoipa::OpenApi;

use crate::api::rest::live::{self, LiveState};
use crate::api::rest::{dto, handlers};
use crate::domain::service::RequestService;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::create_request,
        handlers::list_requests,
        handlers::get_request,
        handlers::update_status,
        handlers::dashboard,
        handlers::geographical,
        live::connect,
    ),
    components(schemas(
        dto::CreateRequestReq,
        dto::CreatedDto,
        dto::LocationDto,
        dto::RequestDto,
        dto::UpdateStatusReq,
        dto::OverviewDto,
        dto::ResponseTimeDto,
        dto::HourBucketDto,
        dto::DashboardDto,
        dto::RequestSummaryDto,
        dto::ClusterDto,
        dto::GeoDto,
        dto::RequestUpdatedDto,
        modkit::Pagination,
        modkit::ErrorBody,
    )),
    tags(
        (name = "emergency", description = "Emergency request intake and triage"),
        (name = "statistics", description = "Dashboard and geographic rollups"),
        (name = "live", description = "Operator live channel"),
    )
)]
pub struct ApiDoc;

pub fn register_routes(
    router: Router,
    service: Arc<RequestService>,
    auth: Arc<AuthService>,
    live: LiveState,
) -> Router {
    let emergency = Router::new()
        // POST /api/emergency/request - Submit a request
        .route("/api/emergency/request", post(handlers::create_request))
        // GET /api/emergency/requests - Paginated list
        .route("/api/emergency/requests", get(handlers::list_requests))
        // GET /api/emergency/requests/{id} - One request
        .route("/api/emergency/requests/{id}", get(handlers::get_request))
        // PUT /api/emergency/requests/{id}/status - Transition
        .route(
            "/api/emergency/requests/{id}/status",
            put(handlers::update_status),
        )
        // GET /api/statistics/dashboard - Dashboard rollup
        .route("/api/statistics/dashboard", get(handlers::dashboard))
        // GET /api/statistics/geographical - Geo rollup
        .route("/api/statistics/geographical", get(handlers::geographical))
        // GET /api/ws - Live operator channel
        .route("/api/ws", get(live::connect))
        .layer(Extension(service))
        .layer(Extension(auth))
        .layer(Extension(live));

    router.merge(emergency)
}
