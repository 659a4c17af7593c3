use async_graphql::ID;
use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::gql::common::types::{MatchNotification, NotificationKind};
use crate::gql::subscriptions::publish_match_notification;
use infra::models::MatchRow;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no subscribers for competition {0}")]
    NoSubscribers(Uuid),

    #[error("notification transport failed: {0}")]
    Transport(String),
}

/// Outbound notification collaborator. Delivery is best effort.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, notification: MatchNotification) -> Result<(), DispatchError>;
}

/// Delivers notifications to GraphQL subscribers of the competition.
#[derive(Debug, Default, Clone)]
pub struct BroadcastDispatcher;

#[async_trait]
impl NotificationDispatcher for BroadcastDispatcher {
    async fn dispatch(&self, notification: MatchNotification) -> Result<(), DispatchError> {
        let competition_id = Uuid::parse_str(notification.competition_id.as_str())
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let delivered = publish_match_notification(competition_id, notification);
        if delivered == 0 {
            return Err(DispatchError::NoSubscribers(competition_id));
        }
        Ok(())
    }
}

pub fn build_notification(
    row: &MatchRow,
    kind: NotificationKind,
    reason: Option<&str>,
) -> MatchNotification {
    let when = row.scheduled_date_time.format("%Y-%m-%d %H:%M UTC");
    let mut message = match kind {
        NotificationKind::Postponed => "Match postponed".to_string(),
        NotificationKind::Rescheduled => format!("Match rescheduled to {when}"),
        NotificationKind::Cancelled => "Match cancelled".to_string(),
        NotificationKind::ResultRecorded => match (row.home_score, row.away_score) {
            (Some(h), Some(a)) => format!("Result recorded: {h}-{a}"),
            _ => "Result recorded".to_string(),
        },
    };
    if let Some(reason) = reason.filter(|r| !r.trim().is_empty()) {
        message.push_str(": ");
        message.push_str(reason.trim());
    }

    MatchNotification {
        id: ID::from(Uuid::new_v4().to_string()),
        competition_id: ID::from(row.competition_id.to_string()),
        match_id: ID::from(row.id.to_string()),
        kind,
        message,
        scheduled_date_time: row.scheduled_date_time,
        created_at: Utc::now(),
    }
}

/// Fire and forget. Called after the mutation committed; failures are only logged.
pub async fn notify(
    dispatcher: &dyn NotificationDispatcher,
    row: &MatchRow,
    kind: NotificationKind,
    reason: Option<&str>,
) {
    let notification = build_notification(row, kind, reason);
    match dispatcher.dispatch(notification).await {
        Ok(()) => {}
        Err(DispatchError::NoSubscribers(_)) => {
            tracing::debug!(match_id = %row.id, ?kind, "No subscribers for match notification");
        }
        Err(e) => {
            warn!(match_id = %row.id, ?kind, "Dropped match notification: {e}");
        }
    }
}
