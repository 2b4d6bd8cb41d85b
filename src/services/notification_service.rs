use serde_json::json;
use surrealdb::sql::Thing;
use tokio::sync::broadcast::Sender;

use crate::entities::user_notification::UserNotificationEvent;
use crate::interfaces::repositories::user_notifications::UserNotificationsInterface;
use crate::middleware::{
    ctx::Ctx,
    error::CtxResult,
    mw_ctx::{AppEvent, AppEventType},
};

pub struct NotificationService<'a, N>
where
    N: UserNotificationsInterface,
{
    notification_repository: &'a N,
    event_sender: &'a Sender<AppEvent>,
    #[allow(dead_code)]
    ctx: &'a Ctx,
}

impl<'a, N> NotificationService<'a, N>
where
    N: UserNotificationsInterface,
{
    pub fn new(
        ctx: &'a Ctx,
        event_sender: &'a Sender<AppEvent>,
        notification_repository: &'a N,
    ) -> NotificationService<'a, N> {
        NotificationService {
            notification_repository,
            event_sender,
            ctx,
        }
    }

    async fn notify(
        &self,
        created_by: &Thing,
        receivers: Vec<String>,
        title: String,
        event: UserNotificationEvent,
        metadata: Option<serde_json::Value>,
    ) -> CtxResult<()> {
        if receivers.is_empty() {
            return Ok(());
        }

        let user_id_str = created_by.to_raw();
        let notification = self
            .notification_repository
            .create(
                &user_id_str,
                title.as_str(),
                event.as_str(),
                &receivers,
                None,
                metadata,
            )
            .await?;

        let _ = self.event_sender.send(AppEvent {
            user_id: user_id_str,
            content: None,
            event: AppEventType::UserNotificationEvent(notification),
            receivers,
        });

        Ok(())
    }

    pub async fn on_application_status(
        &self,
        brand: &Thing,
        creator: &Thing,
        contest_id: &Thing,
        approved: bool,
    ) -> CtxResult<()> {
        let (title, event) = match approved {
            true => (
                "Your contest entry was approved",
                UserNotificationEvent::ApplicationApproved,
            ),
            false => (
                "Your contest entry was rejected",
                UserNotificationEvent::ApplicationRejected,
            ),
        };
        self.notify(
            brand,
            vec![creator.to_raw()],
            title.to_string(),
            event,
            Some(json!({ "contest_id": contest_id.to_raw() })),
        )
        .await
    }

    pub async fn on_winners_finalized(
        &self,
        brand: &Thing,
        contest_id: &Thing,
        winner_users: Vec<Thing>,
    ) -> CtxResult<()> {
        let receivers = winner_users.iter().map(|u| u.to_raw()).collect();
        self.notify(
            brand,
            receivers,
            "Contest winners are in".to_string(),
            UserNotificationEvent::ContestWinnersFinalized,
            Some(json!({ "contest_id": contest_id.to_raw() })),
        )
        .await
    }

    pub async fn on_prize_paid(
        &self,
        brand: &Thing,
        winner: &Thing,
        contest_id: &Thing,
        amount: i64,
        position: u32,
    ) -> CtxResult<()> {
        self.notify(
            brand,
            vec![winner.to_raw()],
            "Your contest prize is on the way".to_string(),
            UserNotificationEvent::ContestPrizePaid,
            Some(json!({
                "contest_id": contest_id.to_raw(),
                "amount": amount,
                "position": position,
            })),
        )
        .await
    }

    pub async fn on_payout_failed(
        &self,
        brand: &Thing,
        winner: &Thing,
        contest_id: &Thing,
        reason: &str,
    ) -> CtxResult<()> {
        self.notify(
            brand,
            vec![brand.to_raw()],
            "A winner payout failed".to_string(),
            UserNotificationEvent::ContestPayoutFailed,
            Some(json!({
                "contest_id": contest_id.to_raw(),
                "winner_id": winner.to_raw(),
                "reason": reason,
            })),
        )
        .await
    }

    pub async fn on_settlement_completed(
        &self,
        brand: &Thing,
        contest_id: &Thing,
        paid: usize,
        failed: usize,
    ) -> CtxResult<()> {
        self.notify(
            brand,
            vec![brand.to_raw()],
            "Contest payout finished".to_string(),
            UserNotificationEvent::ContestSettlementCompleted,
            Some(json!({
                "contest_id": contest_id.to_raw(),
                "paid": paid,
                "failed": failed,
            })),
        )
        .await
    }

    pub async fn on_contest_funded(
        &self,
        brand: &Thing,
        contest_id: &Thing,
        amount: i64,
    ) -> CtxResult<()> {
        self.notify(
            brand,
            vec![brand.to_raw()],
            "Contest funding received".to_string(),
            UserNotificationEvent::ContestFunded,
            Some(json!({
                "contest_id": contest_id.to_raw(),
                "amount": amount,
            })),
        )
        .await
    }
}
