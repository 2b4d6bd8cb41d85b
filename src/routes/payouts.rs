use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::entities::contest::contest_entity::ContestWinner;
use crate::entities::contest::payout_entity::Payout;
use crate::middleware;
use crate::services::contest_service::ContestService;
use crate::services::payout_service::{PayoutService, SettlementSummary};
use middleware::ctx::Ctx;
use middleware::error::CtxResult;
use middleware::mw_ctx::CtxState;

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route(
            "/api/contests/:contest_id/finalize_winners",
            post(finalize_winners),
        )
        .route(
            "/api/contests/:contest_id/payouts/process",
            post(process_payouts),
        )
        .route("/api/contests/:contest_id/payout", get(get_payout))
}

async fn finalize_winners(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(contest_id): Path<String>,
) -> CtxResult<Json<Vec<ContestWinner>>> {
    let contest_service = ContestService::new(
        &state.db.client,
        &ctx,
        &state.event_sender,
        &state.db.user_notifications,
    );

    let winners = contest_service
        .finalize_winners(&ctx.user_id()?, &contest_id)
        .await?;
    Ok(Json(winners))
}

async fn process_payouts(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(contest_id): Path<String>,
) -> CtxResult<Json<SettlementSummary>> {
    let user_thing = ctx.user_thing()?;
    let payout_service = PayoutService::new(
        &state.db.client,
        &ctx,
        &state.event_sender,
        &state.db.user_notifications,
        state.payment.as_ref(),
    );

    let summary = payout_service
        .settle(&contest_id, Some(&user_thing))
        .await?;
    Ok(Json(summary))
}

async fn get_payout(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(contest_id): Path<String>,
) -> CtxResult<Json<Payout>> {
    let payout_service = PayoutService::new(
        &state.db.client,
        &ctx,
        &state.event_sender,
        &state.db.user_notifications,
        state.payment.as_ref(),
    );

    let payout = payout_service.get_latest_payout(&contest_id).await?;
    Ok(Json(payout))
}
