use axum::Router;

/// REST-exposing module. Pure wiring; runs after the module's migrations.
pub trait RestfulModule: Send + Sync {
    /// Stable module name used in logs.
    fn name(&self) -> &'static str;

    /// Attach the module's routes (and the extensions they need) to `router`.
    fn register_rest(&self, router: Router) -> anyhow::Result<Router>;

    /// OpenAPI fragment describing the routes added by [`Self::register_rest`].
    fn openapi(&self) -> utoipa::openapi::OpenApi;
}
