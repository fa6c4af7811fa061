use std::sync::Arc;

use axum::Router;
use modkit::RestfulModule;
use operators::AuthService;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::live::LiveState;
use crate::api::rest::room_adapter::OperatorRoomPublisher;
use crate::api::rest::routes;
use crate::config::EmergencyConfig;
use crate::domain::service::{RequestService, ServiceConfig};
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::SeaOrmRequestsRepository;

/// Emergency request intake, triage, statistics and the live operator channel.
#[derive(Clone)]
pub struct EmergencyModule {
    service: Arc<RequestService>,
    auth: Arc<AuthService>,
    live: LiveState,
}

impl EmergencyModule {
    pub const NAME: &'static str = "emergency";

    /// Run migrations and wire storage and the operator room into the service.
    /// `auth` guards every route except request submission.
    pub async fn init(
        db: DatabaseConnection,
        cfg: EmergencyConfig,
        auth: Arc<AuthService>,
    ) -> anyhow::Result<Self> {
        info!("Initializing emergency module");
        debug!(
            "Loaded emergency config: default_page_size={}, max_page_size={}, geo_result_limit={}, session_buffer={}",
            cfg.default_page_size, cfg.max_page_size, cfg.geo_result_limit, cfg.session_buffer
        );

        Self::migrate(&db).await?;

        let live = LiveState::new(cfg.session_buffer);
        let publisher = OperatorRoomPublisher::new(live.rooms.clone());
        let repo = SeaOrmRequestsRepository::new(db);
        let service = RequestService::new(
            Arc::new(repo),
            Arc::new(publisher),
            ServiceConfig {
                default_page_size: cfg.default_page_size.max(1),
                max_page_size: cfg.max_page_size,
                geo_result_limit: cfg.geo_result_limit,
            },
        );

        Ok(Self {
            service: Arc::new(service),
            auth,
            live,
        })
    }

    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running emergency database migrations");
        Migrator::up(db, None).await?;
        info!("Emergency database migrations completed successfully");
        Ok(())
    }

    pub fn service(&self) -> Arc<RequestService> {
        self.service.clone()
    }

    /// Operator room state, shared with the live channel.
    pub fn live(&self) -> &LiveState {
        &self.live
    }
}

impl RestfulModule for EmergencyModule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn register_rest(&self, router: Router) -> anyhow::Result<Router> {
        info!("Registering emergency REST routes");
        Ok(routes::register_routes(
            router,
            self.service(),
            self.auth.clone(),
            self.live.clone(),
        ))
    }

    fn openapi(&self) -> utoipa::openapi::OpenApi {
        use utoipa::OpenApi;
        routes::ApiDoc::openapi()
    }
}
