use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::{AuthConfig, JwtService};
use crate::config::EngineConfig;
use crate::services::{
    BroadcastDispatcher, MemberDirectory, NotificationDispatcher, PgMemberDirectory,
    PgVenueDirectory, VenueDirectory,
};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: EngineConfig,
    jwt_service: JwtService,
    notifier: Arc<dyn NotificationDispatcher>,
    members: Arc<dyn MemberDirectory>,
    venues: Arc<dyn VenueDirectory>,
}

impl AppState {
    pub fn new(db: PgPool) -> anyhow::Result<Self> {
        let auth_config = AuthConfig::from_env()?;
        let config = EngineConfig::from_env()?;
        Ok(Self::from_parts(db, config, &auth_config))
    }

    /// Wire the default collaborators without reading the environment.
    pub fn from_parts(db: PgPool, config: EngineConfig, auth_config: &AuthConfig) -> Self {
        Self {
            jwt_service: JwtService::new(auth_config),
            notifier: Arc::new(BroadcastDispatcher),
            members: Arc::new(PgMemberDirectory::new(db.clone())),
            venues: Arc::new(PgVenueDirectory::new(db.clone())),
            db,
            config,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationDispatcher>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn notifier(&self) -> &dyn NotificationDispatcher {
        self.notifier.as_ref()
    }

    pub fn members(&self) -> &dyn MemberDirectory {
        self.members.as_ref()
    }

    pub fn venues(&self) -> &dyn VenueDirectory {
        self.venues.as_ref()
    }
}
