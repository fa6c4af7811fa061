use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::config::BootstrapAdmin;
use crate::contract::model::{
    Admin, AdminId, Credentials, LoginSession, NewAdmin, Role, SeedOutcome,
};
use crate::domain::error::DomainError;
use crate::domain::password::{hash_password, verify_password};
use crate::domain::repo::AdminsRepository;
use crate::domain::token::TokenIssuer;
use crate::domain::validation::{new_admin_rules, normalize_email, validate_login};
use modkit::validation::Pipeline;

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub min_password_length: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            min_password_length: 6,
        }
    }
}

/// Admin accounts, login and token-based authentication.
/// Depends only on the repository port, not on infra types.
pub struct AuthService {
    repo: Arc<dyn AdminsRepository>,
    tokens: TokenIssuer,
    new_admin_rules: Pipeline<NewAdmin>,
}

impl AuthService {
    pub fn new(repo: Arc<dyn AdminsRepository>, tokens: TokenIssuer, config: ServiceConfig) -> Self {
        Self {
            repo,
            tokens,
            new_admin_rules: new_admin_rules(config.min_password_length),
        }
    }

    #[instrument(name = "operators.service.login", skip_all)]
    pub async fn login(&self, credentials: Credentials) -> Result<LoginSession, DomainError> {
        validate_login(&credentials).map_err(DomainError::validation)?;
        let email = normalize_email(credentials.email.as_deref().unwrap_or_default());
        let password = credentials.password.unwrap_or_default();

        let Some(stored) = self
            .repo
            .find_by_email(&email)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
        else {
            debug!("login for unknown email");
            return Err(DomainError::InvalidCredentials);
        };

        // Password first so account state is only revealed to its owner.
        if !verify_password(&password, &stored.password_hash)? {
            debug!(admin_id = %stored.admin.id, "login with wrong password");
            return Err(DomainError::InvalidCredentials);
        }
        if !stored.admin.is_active {
            warn!(admin_id = %stored.admin.id, "login to deactivated account");
            return Err(DomainError::AccountDeactivated);
        }

        let now = Utc::now();
        self.repo
            .record_login(&stored.admin.id, now)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        let mut admin = stored.admin;
        admin.last_login = Some(now);
        let token = self.tokens.issue(&admin)?;

        info!(admin_id = %admin.id, "admin logged in");
        Ok(LoginSession { token, admin })
    }

    /// Resolve a bearer token to an active admin.
    #[instrument(name = "operators.service.authenticate", skip_all)]
    pub async fn authenticate(&self, token: &str) -> Result<Admin, DomainError> {
        let claims = self.tokens.verify(token)?;
        let id = AdminId::parse(&claims.sub).ok_or(DomainError::InvalidToken)?;

        let stored = self
            .repo
            .find_by_id(&id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        match stored {
            Some(s) if s.admin.is_active => Ok(s.admin),
            // Unknown and deactivated accounts look the same to the caller.
            Some(_) | None => {
                debug!(admin_id = %id, "token subject missing or deactivated");
                Err(DomainError::InvalidToken)
            }
        }
    }

    pub fn require_super_admin(admin: &Admin) -> Result<(), DomainError> {
        if admin.is_super_admin() {
            Ok(())
        } else {
            Err(DomainError::SuperAdminRequired)
        }
    }

    #[instrument(
        name = "operators.service.create_admin",
        skip(self, actor, input),
        fields(actor_id = %actor.id)
    )]
    pub async fn create_admin(&self, actor: &Admin, input: NewAdmin) -> Result<Admin, DomainError> {
        Self::require_super_admin(actor)?;
        self.new_admin_rules
            .run(&input)
            .map_err(DomainError::validation)?;

        let role = match input.role.as_deref() {
            Some(r) => r.parse::<Role>().unwrap_or_default(),
            None => Role::Admin,
        };
        self.insert_admin(
            input.email.as_deref().unwrap_or_default(),
            input.password.as_deref().unwrap_or_default(),
            input.name.as_deref().unwrap_or_default(),
            role,
        )
        .await
    }

    async fn insert_admin(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: Role,
    ) -> Result<Admin, DomainError> {
        let email = normalize_email(email);
        if self
            .repo
            .find_by_email(&email)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .is_some()
        {
            return Err(DomainError::email_taken(email));
        }

        let now = Utc::now();
        let admin = Admin {
            id: AdminId::generate(),
            email,
            name: name.trim().to_string(),
            role,
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        let hash = hash_password(password)?;

        let inserted = self
            .repo
            .insert(&admin, &hash)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if !inserted {
            return Err(DomainError::email_taken(admin.email));
        }

        info!(admin_id = %admin.id, role = admin.role.as_str(), "admin created");
        Ok(admin)
    }

    #[instrument(name = "operators.service.list_admins", skip_all)]
    pub async fn list_admins(&self, actor: &Admin) -> Result<Vec<Admin>, DomainError> {
        Self::require_super_admin(actor)?;
        self.repo
            .list()
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    #[instrument(
        name = "operators.service.set_admin_status",
        skip(self, actor),
        fields(actor_id = %actor.id, admin_id = %id)
    )]
    pub async fn set_admin_status(
        &self,
        actor: &Admin,
        id: &AdminId,
        is_active: bool,
    ) -> Result<Admin, DomainError> {
        Self::require_super_admin(actor)?;
        if !is_active && &actor.id == id {
            return Err(DomainError::SelfDeactivation);
        }

        let updated = self
            .repo
            .set_active(id, is_active, Utc::now())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::admin_not_found(id.as_str()))?;

        info!(is_active, "admin status changed");
        Ok(updated)
    }

    /// Create the bootstrap super admin unless some admin already exists.
    #[instrument(name = "operators.service.seed", skip_all, fields(email = %bootstrap.email))]
    pub async fn seed(&self, bootstrap: &BootstrapAdmin) -> Result<SeedOutcome, DomainError> {
        let existing = self
            .repo
            .count()
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if existing > 0 {
            debug!(existing, "admins present, seeding skipped");
            return Ok(SeedOutcome::Skipped { existing });
        }

        let admin = self
            .insert_admin(
                &bootstrap.email,
                &bootstrap.password,
                &bootstrap.name,
                Role::SuperAdmin,
            )
            .await?;
        Ok(SeedOutcome::Created(admin))
    }
}
