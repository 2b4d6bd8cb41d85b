use crate::config::AppConfig;
use crate::database::client::Database;
use crate::entities::user_notification::UserNotification;
use crate::interfaces::payment::PaymentInterface;
use crate::utils::jwt::JWT;
use crate::utils::stripe::StripePayment;
use chrono::Duration;
use serde::Serialize;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Serialize)]
pub enum AppEventType {
    UserNotificationEvent(UserNotification),
}

#[derive(Debug, Clone, Serialize)]
pub struct AppEvent {
    pub user_id: String,
    pub content: Option<String>,
    pub event: AppEventType,
    #[serde(skip_serializing)]
    pub receivers: Vec<String>,
}

pub struct CtxState {
    pub db: Database,
    pub is_development: bool,
    pub stripe_secret_key: String,
    pub stripe_wh_secret: String,
    pub stripe_platform_account: String,
    pub jwt: JWT,
    pub event_sender: broadcast::Sender<AppEvent>,
    pub payment: Arc<dyn PaymentInterface + Send + Sync>,
}

impl Debug for CtxState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("CtxState")
    }
}

pub fn create_ctx_state(db: Database, config: &AppConfig) -> Arc<CtxState> {
    let (event_sender, _) = broadcast::channel(100);
    let ctx_state = CtxState {
        db,
        is_development: config.is_development,
        stripe_secret_key: config.stripe_secret_key.clone(),
        stripe_wh_secret: config.stripe_wh_secret.clone(),
        stripe_platform_account: config.stripe_platform_account.clone(),
        jwt: JWT::new(config.jwt_secret.clone(), Duration::days(7)),
        event_sender,
        payment: Arc::new(StripePayment::new(config.stripe_secret_key.clone())),
    };
    Arc::new(ctx_state)
}

pub const JWT_KEY: &str = "jwt";
