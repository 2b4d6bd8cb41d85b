use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;
use tokio::sync::broadcast::Sender;

use crate::{
    database::client::Db,
    entities::contest::{
        contest_entity::{
            Contest, ContestDbService, ContestPayoutStatus, ContestStatus, ContestWinner,
            CurrencySymbol, WinnerPayoutStatus,
        },
        payout_entity::{Payout, PayoutDbService, PayoutStatus, WinnerPayout},
    },
    entities::user_auth::local_user_entity::LocalUserDbService,
    interfaces::payment::PaymentInterface,
    interfaces::repositories::user_notifications::UserNotificationsInterface,
    middleware::{
        ctx::Ctx,
        error::{AppError, CtxResult},
        mw_ctx::AppEvent,
        utils::db_utils::IdentIdName,
        utils::string_utils::get_str_thing,
    },
    services::notification_service::NotificationService,
    utils::stripe::models::TransferRequest,
};

pub const NO_DESTINATION_MSG: &str = "No payable destination";

#[derive(Debug, Serialize, Deserialize)]
pub struct SettlementSummary {
    pub contest: Thing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payout: Option<Thing>,
    pub total_winners: usize,
    pub paid: usize,
    pub failed: usize,
    pub winner_payouts: Vec<WinnerPayout>,
}

pub struct PayoutService<'a, N>
where
    N: UserNotificationsInterface,
{
    contests_repository: ContestDbService<'a>,
    payouts_repository: PayoutDbService<'a>,
    users_repository: LocalUserDbService<'a>,
    notification_service: NotificationService<'a, N>,
    payment: &'a (dyn PaymentInterface + Send + Sync),
    ctx: &'a Ctx,
}

impl<'a, N> PayoutService<'a, N>
where
    N: UserNotificationsInterface,
{
    pub fn new(
        db: &'a Db,
        ctx: &'a Ctx,
        event_sender: &'a Sender<AppEvent>,
        notification_repository: &'a N,
        payment: &'a (dyn PaymentInterface + Send + Sync),
    ) -> Self {
        Self {
            contests_repository: ContestDbService { db, ctx },
            payouts_repository: PayoutDbService { db, ctx },
            users_repository: LocalUserDbService { db, ctx },
            notification_service: NotificationService::new(ctx, event_sender, notification_repository),
            payment,
            ctx,
        }
    }

    /// Runs one settlement attempt for a contest: guard, ledger record,
    /// per-winner transfers, write-back. `requested_by` is the manual trigger
    /// (must be the brand); the background sweep passes None.
    pub async fn settle(
        &self,
        contest_id: &str,
        requested_by: Option<&Thing>,
    ) -> CtxResult<SettlementSummary> {
        let contest_thing = get_str_thing(contest_id)?;
        let contest = self
            .contests_repository
            .get(IdentIdName::Id(contest_thing.clone()))
            .await?;

        if let Some(user) = requested_by {
            if contest.created_by != *user {
                return Err(self.ctx.to_ctx_error(AppError::Forbidden));
            }
        }

        if contest.payout_status != ContestPayoutStatus::None {
            return Err(self.ctx.to_ctx_error(AppError::ContestAlreadySettled));
        }
        if contest.status != ContestStatus::Completed {
            return Err(self.ctx.to_ctx_error(AppError::ContestNotReady {
                status: contest.status.to_string(),
            }));
        }
        if contest.winners.is_none() {
            return Err(self.ctx.to_ctx_error(AppError::WinnersNotFinalized));
        }

        // conditional write; a concurrent settle of the same contest loses here
        let contest = match self
            .contests_repository
            .try_begin_settlement(&contest_thing)
            .await?
        {
            Some(contest) => contest,
            None => return Err(self.classify_guard_failure(&contest_thing).await),
        };

        let winners = contest.winners.clone().unwrap_or_default();
        if winners.is_empty() {
            // nothing to pay; settlement closes without a ledger record
            self.contests_repository
                .finish_settlement(&contest_thing, winners)
                .await?;
            return Ok(SettlementSummary {
                contest: contest_thing,
                payout: None,
                total_winners: 0,
                paid: 0,
                failed: 0,
                winner_payouts: vec![],
            });
        }

        let total_amount: i64 = winners.iter().map(|w| w.prize_amount).sum();
        let pending_rows: Vec<WinnerPayout> = winners
            .iter()
            .map(|winner| WinnerPayout {
                user: winner.user.clone(),
                position: winner.position,
                amount: winner.prize_amount,
                destination_account: None,
                status: WinnerPayoutStatus::Pending,
                transfer_id: None,
                error_message: None,
            })
            .collect();

        let payout_id = self
            .payouts_repository
            .create_for_settlement(
                PayoutDbService::generate_id(),
                contest_thing.clone(),
                contest.created_by.clone(),
                total_amount,
                contest.currency.clone(),
                pending_rows,
            )
            .await?;

        let destinations = self.resolve_destinations(&winners).await;
        let rows = dispatch_transfers(
            self.payment,
            &contest_thing,
            &contest.currency,
            &winners,
            &destinations,
        )
        .await;

        let paid = rows
            .iter()
            .filter(|r| r.status == WinnerPayoutStatus::Completed)
            .count();
        let failed = rows.len() - paid;

        self.payouts_repository
            .record_results(&payout_id, PayoutStatus::Completed, rows.clone())
            .await?;

        let settled_winners = apply_payout_results(winners, &rows);
        self.contests_repository
            .finish_settlement(&contest_thing, settled_winners)
            .await?;

        self.send_settlement_notifications(&contest, &contest_thing, &rows, paid, failed)
            .await;

        Ok(SettlementSummary {
            contest: contest_thing,
            payout: Some(payout_id),
            total_winners: rows.len(),
            paid,
            failed,
            winner_payouts: rows,
        })
    }

    pub async fn get_latest_payout(&self, contest_id: &str) -> CtxResult<Payout> {
        let contest_thing = get_str_thing(contest_id)?;
        let mut payouts = self
            .payouts_repository
            .get_by_contest(&contest_thing)
            .await?;
        if payouts.is_empty() {
            return Err(self.ctx.to_ctx_error(AppError::EntityFailIdNotFound {
                ident: format!("payout for {}", contest_thing.to_raw()),
            }));
        }
        Ok(payouts.remove(0))
    }

    async fn resolve_destinations(
        &self,
        winners: &[ContestWinner],
    ) -> HashMap<String, Option<String>> {
        let mut destinations = HashMap::with_capacity(winners.len());
        for winner in winners {
            let account = match self
                .users_repository
                .get(IdentIdName::Id(winner.user.clone()))
                .await
            {
                Ok(user) => user.payout_account,
                Err(_) => None,
            };
            destinations.insert(winner.user.to_raw(), account);
        }
        destinations
    }

    async fn classify_guard_failure(&self, contest_thing: &Thing) -> crate::middleware::error::CtxError {
        match self
            .contests_repository
            .get(IdentIdName::Id(contest_thing.clone()))
            .await
        {
            Ok(contest) if contest.payout_status != ContestPayoutStatus::None => {
                self.ctx.to_ctx_error(AppError::ContestAlreadySettled)
            }
            Ok(contest) => self.ctx.to_ctx_error(AppError::ContestNotReady {
                status: contest.status.to_string(),
            }),
            Err(err) => err,
        }
    }

    async fn send_settlement_notifications(
        &self,
        contest: &Contest,
        contest_thing: &Thing,
        rows: &[WinnerPayout],
        paid: usize,
        failed: usize,
    ) {
        for row in rows {
            match row.status {
                WinnerPayoutStatus::Completed if row.amount > 0 => {
                    let _ = self
                        .notification_service
                        .on_prize_paid(
                            &contest.created_by,
                            &row.user,
                            contest_thing,
                            row.amount,
                            row.position,
                        )
                        .await;
                }
                WinnerPayoutStatus::Failed => {
                    let reason = row.error_message.as_deref().unwrap_or("unknown");
                    let _ = self
                        .notification_service
                        .on_payout_failed(&contest.created_by, &row.user, contest_thing, reason)
                        .await;
                }
                _ => {}
            }
        }
        let _ = self
            .notification_service
            .on_settlement_completed(&contest.created_by, contest_thing, paid, failed)
            .await;
    }
}

/// One transfer attempt per winner, in ranking order. A winner without a
/// payable destination or with a rejected transfer is recorded as failed and
/// the loop moves on; nothing here aborts the batch or retries.
pub async fn dispatch_transfers(
    payment: &(dyn PaymentInterface + Send + Sync),
    contest_id: &Thing,
    currency: &CurrencySymbol,
    winners: &[ContestWinner],
    destinations: &HashMap<String, Option<String>>,
) -> Vec<WinnerPayout> {
    let mut rows = Vec::with_capacity(winners.len());

    for winner in winners {
        let mut row = WinnerPayout {
            user: winner.user.clone(),
            position: winner.position,
            amount: winner.prize_amount,
            destination_account: None,
            status: WinnerPayoutStatus::Pending,
            transfer_id: None,
            error_message: None,
        };

        let destination = destinations.get(&winner.user.to_raw()).cloned().flatten();

        let Some(destination) = destination else {
            row.status = WinnerPayoutStatus::Failed;
            row.error_message = Some(NO_DESTINATION_MSG.to_string());
            rows.push(row);
            continue;
        };

        row.destination_account = Some(destination.clone());

        if winner.prize_amount <= 0 {
            // position past the prize table; nothing to move
            row.status = WinnerPayoutStatus::Completed;
            rows.push(row);
            continue;
        }

        let request = TransferRequest {
            destination_account: destination,
            amount: winner.prize_amount,
            currency: currency.to_string(),
            idempotency_key: format!(
                "{}:{}:{}",
                contest_id.to_raw(),
                winner.user.to_raw(),
                winner.position
            ),
            metadata: HashMap::from([
                ("contest".to_string(), contest_id.to_raw()),
                ("user".to_string(), winner.user.to_raw()),
                ("position".to_string(), winner.position.to_string()),
            ]),
        };

        match payment.create_transfer(request).await {
            Ok(transfer) => {
                row.status = WinnerPayoutStatus::Completed;
                row.transfer_id = Some(transfer.id);
            }
            Err(e) => {
                row.status = WinnerPayoutStatus::Failed;
                row.error_message = Some(e);
            }
        }
        rows.push(row);
    }

    rows
}

/// Copies per-winner outcomes back onto the contest's denormalized summary.
fn apply_payout_results(
    winners: Vec<ContestWinner>,
    rows: &[WinnerPayout],
) -> Vec<ContestWinner> {
    winners
        .into_iter()
        .map(|mut winner| {
            if let Some(row) = rows
                .iter()
                .find(|r| r.user == winner.user && r.position == winner.position)
            {
                winner.payout_status = row.status.clone();
            }
            winner
        })
        .collect()
}
