use crate::utils::validate_utils::deserialize_thing_id;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Clone, Deserialize)]
pub struct UserNotification {
    #[serde(deserialize_with = "deserialize_thing_id")]
    pub id: String,
    #[serde(deserialize_with = "deserialize_thing_id")]
    pub created_by: String,
    #[serde(rename(deserialize = "type"))]
    pub event: UserNotificationEvent,
    pub title: String,
    #[serde(default)]
    pub is_read: bool,
    pub content: Option<String>,
    pub metadata: Option<Value>,
    pub created_at: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum UserNotificationEvent {
    ApplicationApproved,
    ApplicationRejected,
    ContestWinnersFinalized,
    ContestPrizePaid,
    ContestPayoutFailed,
    ContestSettlementCompleted,
    ContestFunded,
}

impl UserNotificationEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserNotificationEvent::ApplicationApproved => "ApplicationApproved",
            UserNotificationEvent::ApplicationRejected => "ApplicationRejected",
            UserNotificationEvent::ContestWinnersFinalized => "ContestWinnersFinalized",
            UserNotificationEvent::ContestPrizePaid => "ContestPrizePaid",
            UserNotificationEvent::ContestPayoutFailed => "ContestPayoutFailed",
            UserNotificationEvent::ContestSettlementCompleted => "ContestSettlementCompleted",
            UserNotificationEvent::ContestFunded => "ContestFunded",
        }
    }
}
