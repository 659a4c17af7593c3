use async_graphql::{Enum, InputObject, SimpleObject, ID};
use chrono::{DateTime, Utc};
use infra::pagination::LimitOffset;

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
pub enum Role {
    Admin,
    Manager,
    Player,
}

impl From<&str> for Role {
    fn from(role: &str) -> Self {
        match role {
            "admin" => Role::Admin,
            "manager" => Role::Manager,
            _ => Role::Player, // unknown roles get the least privilege
        }
    }
}

#[derive(InputObject, Clone, Copy, Debug, Default)]
pub struct PaginationInput {
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

impl PaginationInput {
    pub fn to_limit_offset(&self) -> LimitOffset {
        let defaults = LimitOffset::default();
        LimitOffset {
            limit: self
                .limit
                .map(|l| i64::from(l).clamp(1, 200))
                .unwrap_or(defaults.limit),
            offset: self
                .offset
                .map(|o| i64::from(o).max(0))
                .unwrap_or(defaults.offset),
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
pub enum NotificationKind {
    Postponed,
    Rescheduled,
    Cancelled,
    ResultRecorded,
}

#[derive(SimpleObject, Clone, Debug, serde::Serialize)]
pub struct MatchNotification {
    pub id: ID,
    pub competition_id: ID,
    pub match_id: ID,
    pub kind: NotificationKind,
    pub message: String,
    pub scheduled_date_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_is_bounded() {
        let page = PaginationInput {
            limit: Some(10_000),
            offset: Some(-5),
        }
        .to_limit_offset();
        assert_eq!(page.limit, 200);
        assert_eq!(page.offset, 0);

        let default = PaginationInput::default().to_limit_offset();
        assert_eq!(default.limit, 50);
    }

    #[test]
    fn unknown_roles_are_players() {
        assert_eq!(Role::from("admin"), Role::Admin);
        assert_eq!(Role::from("superuser"), Role::Player);
    }
}
