use async_graphql::dataloader::Loader;
use infra::models::{CompetitionParticipantRow, CompetitionRow, CompetitionTeamRow};
use infra::{db::Db, repos};
use std::{collections::HashMap, future::Future, sync::Arc};
use uuid::Uuid;

// TeamLoader - batch load competition teams by ID
#[derive(Clone)]
pub struct TeamLoader {
    pool: Db,
}

impl TeamLoader {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

impl Loader<Uuid> for TeamLoader {
    type Value = CompetitionTeamRow;
    type Error = Arc<sqlx::Error>;

    fn load(
        &self,
        keys: &[Uuid],
    ) -> impl Future<Output = std::result::Result<HashMap<Uuid, Self::Value>, Self::Error>> + Send
    {
        let pool = self.pool.clone();
        let ids: Vec<Uuid> = keys.to_vec();

        async move {
            if ids.is_empty() {
                return Ok(HashMap::new());
            }
            let rows = repos::competition_teams::get_by_ids(&pool, &ids)
                .await
                .map_err(Arc::new)?;
            Ok(rows.into_iter().map(|r| (r.id, r)).collect())
        }
    }
}

// ParticipantLoader - batch load participants (scorers, lineups, events)
#[derive(Clone)]
pub struct ParticipantLoader {
    pool: Db,
}

impl ParticipantLoader {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

impl Loader<Uuid> for ParticipantLoader {
    type Value = CompetitionParticipantRow;
    type Error = Arc<sqlx::Error>;

    fn load(
        &self,
        keys: &[Uuid],
    ) -> impl Future<Output = std::result::Result<HashMap<Uuid, Self::Value>, Self::Error>> + Send
    {
        let pool = self.pool.clone();
        let ids: Vec<Uuid> = keys.to_vec();

        async move {
            if ids.is_empty() {
                return Ok(HashMap::new());
            }
            let rows = repos::competition_participants::get_by_ids(&pool, &ids)
                .await
                .map_err(Arc::new)?;
            Ok(rows.into_iter().map(|r| (r.id, r)).collect())
        }
    }
}

// CompetitionLoader - batch load competitions for seasons and matches
#[derive(Clone)]
pub struct CompetitionLoader {
    pool: Db,
}

impl CompetitionLoader {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

impl Loader<Uuid> for CompetitionLoader {
    type Value = CompetitionRow;
    type Error = Arc<sqlx::Error>;

    fn load(
        &self,
        keys: &[Uuid],
    ) -> impl Future<Output = std::result::Result<HashMap<Uuid, Self::Value>, Self::Error>> + Send
    {
        let pool = self.pool.clone();
        let ids: Vec<Uuid> = keys.to_vec();

        async move {
            if ids.is_empty() {
                return Ok(HashMap::new());
            }
            let rows = repos::competitions::get_by_ids(&pool, &ids)
                .await
                .map_err(Arc::new)?;
            Ok(rows.into_iter().map(|r| (r.id, r)).collect())
        }
    }
}
