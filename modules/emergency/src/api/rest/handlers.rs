use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::Response,
    Extension,
};
use modkit::api::{ApiResponse, ApiResult, ErrorBody, JsonBody, Pagination};
use operators::CurrentAdmin;
use tracing::info;

use crate::api::rest::dto::{
    CreateRequestReq, CreatedDto, DashboardDto, DashboardQuery, GeoDto, GeoQuery,
    ListRequestsQuery, RequestDto, UpdateStatusReq,
};
use crate::api::rest::error::invalid_id;
use crate::contract::model::{ListParams, RequestId};
use crate::domain::service::RequestService;

/// Submit an emergency request (public)
#[utoipa::path(
    post,
    path = "/api/emergency/request",
    tag = "emergency",
    request_body = CreateRequestReq,
    responses(
        (status = 201, description = "Emergency request created successfully", body = CreatedDto),
        (status = 400, description = "Validation failed", body = ErrorBody),
    )
)]
pub async fn create_request(
    Extension(svc): Extension<Arc<RequestService>>,
    JsonBody(req): JsonBody<CreateRequestReq>,
) -> ApiResult<Response> {
    let request = svc.create(req.into()).await?;
    Ok(ApiResponse::ok(CreatedDto::from(&request))
        .with_message("Emergency request created successfully")
        .created())
}

/// Page through emergency requests
#[utoipa::path(
    get,
    path = "/api/emergency/requests",
    tag = "emergency",
    params(ListRequestsQuery),
    responses(
        (status = 200, description = "One page of requests", body = Vec<RequestDto>),
        (status = 400, description = "Unknown status, priority or sort field", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn list_requests(
    Extension(svc): Extension<Arc<RequestService>>,
    _admin: CurrentAdmin,
    Query(query): Query<ListRequestsQuery>,
) -> ApiResult<ApiResponse<Vec<RequestDto>>> {
    let page = svc.list(&ListParams::from(query)).await?;
    let pagination = Pagination::new(page.page, page.page_size, page.total);
    Ok(ApiResponse::paginated(
        page.items.into_iter().map(RequestDto::from).collect(),
        pagination,
    ))
}

/// One emergency request
#[utoipa::path(
    get,
    path = "/api/emergency/requests/{id}",
    tag = "emergency",
    params(("id" = String, Path, description = "Request identifier")),
    responses(
        (status = 200, description = "Request found", body = RequestDto),
        (status = 400, description = "Invalid ID format", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "Emergency request not found", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn get_request(
    Extension(svc): Extension<Arc<RequestService>>,
    _admin: CurrentAdmin,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<RequestDto>> {
    let id = RequestId::parse(&id).ok_or_else(invalid_id)?;
    let request = svc.get(&id).await?;
    Ok(ApiResponse::ok(RequestDto::from(request)))
}

/// Move a request to a new status
#[utoipa::path(
    put,
    path = "/api/emergency/requests/{id}/status",
    tag = "emergency",
    params(("id" = String, Path, description = "Request identifier")),
    request_body = UpdateStatusReq,
    responses(
        (status = 200, description = "Emergency request updated successfully", body = RequestDto),
        (status = 400, description = "Invalid id, missing or unknown status, notes too long", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "Emergency request not found", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn update_status(
    Extension(svc): Extension<Arc<RequestService>>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateStatusReq>,
) -> ApiResult<ApiResponse<RequestDto>> {
    let id = RequestId::parse(&id).ok_or_else(invalid_id)?;
    info!(admin_id = %admin.id, request_id = %id, "status update requested");
    let request = svc.transition(&id, req.into()).await?;
    Ok(ApiResponse::ok(RequestDto::from(request))
        .with_message("Emergency request updated successfully"))
}

/// Dashboard rollup for a time window
#[utoipa::path(
    get,
    path = "/api/statistics/dashboard",
    tag = "statistics",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardDto),
        (status = 401, description = "Not authenticated", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn dashboard(
    Extension(svc): Extension<Arc<RequestService>>,
    _admin: CurrentAdmin,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<ApiResponse<DashboardDto>> {
    let stats = svc.dashboard(query.time_range.as_deref()).await?;
    Ok(ApiResponse::ok(DashboardDto::from(stats)))
}

/// Recent requests and coarse location clusters, optionally inside bounds
#[utoipa::path(
    get,
    path = "/api/statistics/geographical",
    tag = "statistics",
    params(GeoQuery),
    responses(
        (status = 200, description = "Geographic statistics", body = GeoDto),
        (status = 400, description = "Invalid bounds format", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn geographical(
    Extension(svc): Extension<Arc<RequestService>>,
    _admin: CurrentAdmin,
    Query(query): Query<GeoQuery>,
) -> ApiResult<ApiResponse<GeoDto>> {
    let stats = svc.geographical(query.bounds.as_deref()).await?;
    Ok(ApiResponse::ok(GeoDto::from(stats)))
}
