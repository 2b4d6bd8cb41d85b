use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::{
    entities::contest::contest_entity::ContestDbService,
    middleware::{ctx::Ctx, mw_ctx::CtxState},
    services::payout_service::PayoutService,
};

/// Background sweep that settles completed contests once their end date has
/// passed. Each contest is attempted independently; the settlement guard
/// keeps this from racing a manual payout trigger.
pub async fn run(state: Arc<CtxState>, period: Duration) -> JoinHandle<()> {
    let state = state.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(period).await;

            let ctx = Ctx::new(Ok("contest_settlement".to_string()), Uuid::new_v4());
            let contests_repository = ContestDbService {
                db: &state.db.client,
                ctx: &ctx,
            };

            let candidates = match contests_repository.get_ready_for_settlement().await {
                Ok(candidates) => candidates,
                Err(_) => continue,
            };

            let now = Utc::now();
            for contest in candidates {
                if contest.prize_plan.end_at > now {
                    continue;
                }
                let Some(ref contest_id) = contest.id else {
                    continue;
                };

                let payout_service = PayoutService::new(
                    &state.db.client,
                    &ctx,
                    &state.event_sender,
                    &state.db.user_notifications,
                    state.payment.as_ref(),
                );

                match payout_service.settle(&contest_id.to_raw(), None).await {
                    Ok(summary) => {
                        tracing::info!(
                            "settled contest {} paid={} failed={}",
                            contest_id.to_raw(),
                            summary.paid,
                            summary.failed
                        );
                    }
                    Err(e) => {
                        tracing::warn!(
                            "settlement failed for contest {}: {:?}",
                            contest_id.to_raw(),
                            e.error
                        );
                    }
                }
            }
        }
    })
}
