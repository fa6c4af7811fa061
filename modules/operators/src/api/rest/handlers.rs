use std::sync::Arc;

use axum::{extract::Path, Extension};
use modkit::api::{ApiError, ApiResponse, ApiResult, ErrorBody, JsonBody};
use tracing::info;

use crate::api::rest::dto::{
    AdminDto, CreateAdminReq, LoginDto, LoginReq, ProfileDto, UpdateAdminStatusReq, VerifyDto,
};
use crate::api::rest::error::invalid_id;
use crate::api::rest::extract::{CurrentAdmin, SuperAdmin};
use crate::contract::model::AdminId;
use crate::domain::service::AuthService;

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/api/admin/login",
    tag = "admin",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Login successful", body = LoginDto),
        (status = 400, description = "Validation failed", body = ErrorBody),
        (status = 401, description = "Invalid credentials or deactivated account", body = ErrorBody),
    )
)]
pub async fn login(
    Extension(svc): Extension<Arc<AuthService>>,
    JsonBody(req): JsonBody<LoginReq>,
) -> ApiResult<ApiResponse<LoginDto>> {
    let session = svc.login(req.into()).await?;
    Ok(ApiResponse::ok(LoginDto::from(session)).with_message("Login successful"))
}

/// Check that the presented token is still valid
#[utoipa::path(
    get,
    path = "/api/admin/verify",
    tag = "admin",
    responses(
        (status = 200, description = "Token is valid", body = VerifyDto),
        (status = 401, description = "Missing, expired or invalid token", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn verify(CurrentAdmin(admin): CurrentAdmin) -> ApiResponse<VerifyDto> {
    ApiResponse::ok(VerifyDto::from(admin)).with_message("Token is valid")
}

/// Profile of the authenticated admin
#[utoipa::path(
    get,
    path = "/api/admin/profile",
    tag = "admin",
    responses(
        (status = 200, description = "Current admin", body = ProfileDto),
        (status = 401, description = "Missing, expired or invalid token", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn profile(CurrentAdmin(admin): CurrentAdmin) -> ApiResponse<ProfileDto> {
    ApiResponse::ok(ProfileDto::from(admin))
}

/// Create another admin account (super admin only)
#[utoipa::path(
    post,
    path = "/api/admin/create",
    tag = "admin",
    request_body = CreateAdminReq,
    responses(
        (status = 201, description = "Admin created successfully", body = AdminDto),
        (status = 400, description = "Validation failed", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 403, description = "Super admin role required", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn create_admin(
    Extension(svc): Extension<Arc<AuthService>>,
    SuperAdmin(actor): SuperAdmin,
    JsonBody(req): JsonBody<CreateAdminReq>,
) -> ApiResult<axum::response::Response> {
    info!(actor_id = %actor.id, "creating admin");
    let admin = svc.create_admin(&actor, req.into()).await?;
    Ok(ApiResponse::ok(AdminDto::from(admin))
        .with_message("Admin created successfully")
        .created())
}

/// All admin accounts, newest first (super admin only)
#[utoipa::path(
    get,
    path = "/api/admin/all",
    tag = "admin",
    responses(
        (status = 200, description = "Admin accounts", body = Vec<AdminDto>),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 403, description = "Super admin role required", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn list_admins(
    Extension(svc): Extension<Arc<AuthService>>,
    SuperAdmin(actor): SuperAdmin,
) -> ApiResult<ApiResponse<Vec<AdminDto>>> {
    let admins = svc.list_admins(&actor).await?;
    Ok(ApiResponse::ok(
        admins.into_iter().map(AdminDto::from).collect(),
    ))
}

/// Activate or deactivate an admin account (super admin only)
#[utoipa::path(
    put,
    path = "/api/admin/{id}/status",
    tag = "admin",
    params(("id" = String, Path, description = "Admin identifier")),
    request_body = UpdateAdminStatusReq,
    responses(
        (status = 200, description = "Admin status updated successfully", body = AdminDto),
        (status = 400, description = "Invalid id, missing flag or self-deactivation", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 403, description = "Super admin role required", body = ErrorBody),
        (status = 404, description = "Admin not found", body = ErrorBody),
    ),
    security(("bearer" = []))
)]
pub async fn update_admin_status(
    Extension(svc): Extension<Arc<AuthService>>,
    SuperAdmin(actor): SuperAdmin,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateAdminStatusReq>,
) -> ApiResult<ApiResponse<AdminDto>> {
    let id = AdminId::parse(&id).ok_or_else(invalid_id)?;
    let is_active = req
        .is_active
        .ok_or_else(|| ApiError::validation(vec!["isActive must be a boolean".to_string()]))?;

    let admin = svc.set_admin_status(&actor, &id, is_active).await?;
    Ok(ApiResponse::ok(AdminDto::from(admin)).with_message("Admin status updated successfully"))
}
