use async_trait::async_trait;
use uuid::Uuid;

use crate::engine::EngineResult;
use infra::db::Db;
use infra::repos::members;

/// What the competition engine needs to know about a club member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberProfile {
    pub id: Uuid,
    pub club_id: Uuid,
    pub display_name: String,
    pub is_active: bool,
}

/// Membership is owned elsewhere; the engine only resolves and checks eligibility.
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    async fn resolve(&self, member_id: Uuid) -> EngineResult<Option<MemberProfile>>;
}

#[derive(Clone)]
pub struct PgMemberDirectory {
    pool: Db,
}

impl PgMemberDirectory {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberDirectory for PgMemberDirectory {
    async fn resolve(&self, member_id: Uuid) -> EngineResult<Option<MemberProfile>> {
        let row = members::get_by_id(&self.pool, member_id).await?;
        Ok(row.map(|m| MemberProfile {
            id: m.id,
            club_id: m.club_id,
            display_name: m.display_name(),
            is_active: m.is_active,
        }))
    }
}
