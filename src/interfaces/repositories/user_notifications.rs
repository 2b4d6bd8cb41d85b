use async_trait::async_trait;
use serde_json::Value;

use crate::entities::user_notification::UserNotification;
use crate::middleware::error::AppError;

/// Notification persistence: one record fanned out to a set of receivers,
/// each with their own read flag.
#[async_trait]
pub trait UserNotificationsInterface {
    async fn create(
        &self,
        creator: &str,
        title: &str,
        n_type: &str,
        receivers: &[String],
        content: Option<String>,
        metadata: Option<Value>,
    ) -> Result<UserNotification, AppError>;

    async fn get_by_user(&self, user_id: &str) -> Result<Vec<UserNotification>, AppError>;

    async fn get_by_id(&self, id: &str, user_id: &str) -> Result<UserNotification, AppError>;

    async fn mark_read(&self, id: &str) -> Result<(), AppError>;
}
