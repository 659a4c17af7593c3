use async_trait::async_trait;
use uuid::Uuid;

use crate::engine::EngineResult;
use infra::db::Db;
use infra::repos::venues;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueProfile {
    pub id: Uuid,
    pub club_id: Uuid,
    pub name: String,
    pub address: Option<String>,
}

#[async_trait]
pub trait VenueDirectory: Send + Sync {
    async fn resolve(&self, venue_id: Uuid) -> EngineResult<Option<VenueProfile>>;
    async fn list_for_club(&self, club_id: Uuid) -> EngineResult<Vec<VenueProfile>>;
}

#[derive(Clone)]
pub struct PgVenueDirectory {
    pool: Db,
}

impl PgVenueDirectory {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

fn profile(row: infra::models::VenueRow) -> VenueProfile {
    let address = match (row.address, row.city) {
        (Some(a), Some(c)) => Some(format!("{a}, {c}")),
        (a, c) => a.or(c),
    };
    VenueProfile {
        id: row.id,
        club_id: row.club_id,
        name: row.name,
        address,
    }
}

#[async_trait]
impl VenueDirectory for PgVenueDirectory {
    async fn resolve(&self, venue_id: Uuid) -> EngineResult<Option<VenueProfile>> {
        Ok(venues::get_by_id(&self.pool, venue_id).await?.map(profile))
    }

    async fn list_for_club(&self, club_id: Uuid) -> EngineResult<Vec<VenueProfile>> {
        let rows = venues::list_by_club(&self.pool, club_id).await?;
        Ok(rows.into_iter().map(profile).collect())
    }
}
