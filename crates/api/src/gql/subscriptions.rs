use async_graphql::{Result, Subscription, ID};
use futures_util::Stream;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use uuid::Uuid;

use crate::gql::common::types::MatchNotification;
use crate::gql::error::ResultExt;

const CHANNEL_CAPACITY: usize = 100;

/// Per-competition notification channels.
static CHANNELS: Lazy<Arc<Mutex<HashMap<Uuid, broadcast::Sender<MatchNotification>>>>> =
    Lazy::new(|| Arc::new(Mutex::new(HashMap::new())));

pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Postponements, reschedules, cancellations and results of a competition's matches.
    async fn match_notifications(
        &self,
        competition_id: ID,
    ) -> Result<impl Stream<Item = Result<MatchNotification, BroadcastStreamRecvError>>> {
        let competition_id =
            Uuid::parse_str(competition_id.as_str()).gql_err("Invalid competition ID")?;

        let receiver = {
            let mut channels = CHANNELS.lock();
            channels
                .entry(competition_id)
                .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
                .subscribe()
        };

        Ok(BroadcastStream::new(receiver))
    }
}

/// Publish to the competition's subscribers. Returns how many received it.
pub fn publish_match_notification(competition_id: Uuid, notification: MatchNotification) -> usize {
    let mut channels = CHANNELS.lock();
    let Some(sender) = channels.get(&competition_id) else {
        return 0;
    };
    match sender.send(notification) {
        Ok(receivers) => receivers,
        Err(_) => {
            // every subscriber went away
            channels.remove(&competition_id);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::outcome::tests::scheduled;
    use crate::gql::common::types::NotificationKind;
    use crate::services::notification_service::build_notification;

    #[test]
    fn publishing_without_subscribers_is_a_no_op() {
        let row = scheduled(Uuid::new_v4(), Uuid::new_v4());
        let n = build_notification(&row, NotificationKind::Postponed, None);
        assert_eq!(publish_match_notification(Uuid::new_v4(), n), 0);
    }

    #[tokio::test]
    async fn subscribers_receive_their_competition_only() {
        let competition_id = Uuid::new_v4();
        let mut receiver = {
            let mut channels = CHANNELS.lock();
            channels
                .entry(competition_id)
                .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
                .subscribe()
        };

        let mut row = scheduled(Uuid::new_v4(), Uuid::new_v4());
        row.competition_id = competition_id;
        let n = build_notification(&row, NotificationKind::Cancelled, Some("storm"));
        assert_eq!(publish_match_notification(competition_id, n), 1);

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.kind, NotificationKind::Cancelled);
        assert_eq!(received.match_id, ID::from(row.id.to_string()));
    }
}
