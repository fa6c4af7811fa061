use std::sync::Arc;

use axum::Router;
use modkit::RestfulModule;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info, warn};

use crate::api::rest::routes;
use crate::config::{BootstrapAdmin, OperatorsConfig};
use crate::contract::model::SeedOutcome;
use crate::domain::service::{AuthService, ServiceConfig};
use crate::domain::token::TokenIssuer;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::sea_orm_repo::SeaOrmAdminsRepository;

/// Operator accounts and bearer-token authentication.
#[derive(Clone)]
pub struct OperatorsModule {
    service: Arc<AuthService>,
    bootstrap: Option<BootstrapAdmin>,
}

impl OperatorsModule {
    pub const NAME: &'static str = "operators";

    /// Run migrations and wire the repository into the service.
    pub async fn init(db: DatabaseConnection, cfg: OperatorsConfig) -> anyhow::Result<Self> {
        info!("Initializing operators module");
        debug!(
            "Loaded operators config: issuer={}, token_ttl_secs={}, min_password_length={}",
            cfg.jwt_issuer, cfg.token_ttl_secs, cfg.min_password_length
        );

        Self::migrate(&db).await?;

        let secret = if cfg.jwt_secret.is_empty() {
            warn!("operators.jwt_secret is not set; using an ephemeral secret, tokens will not survive a restart");
            hex::encode(rand::random::<[u8; 32]>())
        } else {
            cfg.jwt_secret.clone()
        };
        let tokens = TokenIssuer::new(&secret, cfg.jwt_issuer.clone(), cfg.token_ttl_secs);

        let repo = SeaOrmAdminsRepository::new(db);
        let service = AuthService::new(
            Arc::new(repo),
            tokens,
            ServiceConfig {
                min_password_length: cfg.min_password_length,
            },
        );

        Ok(Self {
            service: Arc::new(service),
            bootstrap: cfg.bootstrap_admin,
        })
    }

    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running operators database migrations");
        Migrator::up(db, None).await?;
        info!("Operators database migrations completed successfully");
        Ok(())
    }

    /// Shared with other modules so they can authenticate their own routes.
    pub fn service(&self) -> Arc<AuthService> {
        self.service.clone()
    }

    /// Create the configured bootstrap super admin when the table is empty.
    pub async fn seed_if_configured(&self) -> anyhow::Result<Option<SeedOutcome>> {
        let Some(bootstrap) = &self.bootstrap else {
            return Ok(None);
        };
        self.seed(bootstrap).await.map(Some)
    }

    pub async fn seed(&self, bootstrap: &BootstrapAdmin) -> anyhow::Result<SeedOutcome> {
        let outcome = self.service.seed(bootstrap).await?;
        match &outcome {
            SeedOutcome::Created(admin) => {
                info!(admin_id = %admin.id, email = %admin.email, "bootstrap super admin created");
            }
            SeedOutcome::Skipped { existing } => {
                info!(existing, "bootstrap skipped, admins already present");
            }
        }
        Ok(outcome)
    }
}

impl RestfulModule for OperatorsModule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn register_rest(&self, router: Router) -> anyhow::Result<Router> {
        info!("Registering operators REST routes");
        Ok(routes::register_routes(router, self.service()))
    }

    fn openapi(&self) -> utoipa::openapi::OpenApi {
        use utoipa::OpenApi;
        routes::ApiDoc::openapi()
    }
}
