use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Extension, Router,
};
use utoipa::OpenApi;

use crate::api::rest::{dto, handlers};
use crate::domain::service::AuthService;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login,
        handlers::verify,
        handlers::profile,
        handlers::create_admin,
        handlers::list_admins,
        handlers::update_admin_status,
    ),
    components(schemas(
        dto::LoginReq,
        dto::LoginDto,
        dto::LoginAdminDto,
        dto::ProfileDto,
        dto::VerifyDto,
        dto::VerifiedAdminDto,
        dto::CreateAdminReq,
        dto::AdminDto,
        dto::UpdateAdminStatusReq,
        modkit::ErrorBody,
    )),
    tags((name = "admin", description = "Operator accounts and authentication"))
)]
pub struct ApiDoc;

pub fn register_routes(router: Router, service: Arc<AuthService>) -> Router {
    let admin = Router::new()
        // POST /api/admin/login - Exchange credentials for a token
        .route("/api/admin/login", post(handlers::login))
        // GET /api/admin/verify - Validate the presented token
        .route("/api/admin/verify", get(handlers::verify))
        // GET /api/admin/profile - Current admin
        .route("/api/admin/profile", get(handlers::profile))
        // POST /api/admin/create - New admin account
        .route("/api/admin/create", post(handlers::create_admin))
        // GET /api/admin/all - Every admin account
        .route("/api/admin/all", get(handlers::list_admins))
        // PUT /api/admin/{id}/status - Activate or deactivate
        .route("/api/admin/{id}/status", put(handlers::update_admin_status))
        .layer(Extension(service));

    router.merge(admin)
}
