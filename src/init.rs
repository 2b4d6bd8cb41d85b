use std::sync::Arc;

use axum::{
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use reqwest::StatusCode;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::{
    database::client::Database,
    entities::contest::application_entity::ApplicationDbService,
    entities::contest::contest_entity::ContestDbService,
    entities::contest::payout_entity::PayoutDbService,
    entities::user_auth::local_user_entity::LocalUserDbService,
    middleware::{ctx::Ctx, error::AppResult, mw_ctx::CtxState},
    routes::{contests, events, funding, notifications, payout_accounts, payouts, users, webhooks},
};

pub async fn run_migrations(database: &Database) -> AppResult<()> {
    let db = database.client.clone();
    let c = Ctx::new(Ok("migrations".to_string()), Uuid::new_v4());

    LocalUserDbService { db: &db, ctx: &c }.mutate_db().await?;
    ContestDbService { db: &db, ctx: &c }.mutate_db().await?;
    ApplicationDbService { db: &db, ctx: &c }.mutate_db().await?;
    PayoutDbService { db: &db, ctx: &c }.mutate_db().await?;
    Ok(())
}

pub fn main_router(ctx_state: &Arc<CtxState>) -> Router {
    Router::new()
        .route("/hc", get(get_hc))
        .merge(contests::routes())
        .merge(payouts::routes())
        .merge(funding::routes())
        .merge(payout_accounts::routes())
        .merge(users::routes(ctx_state.is_development))
        .merge(notifications::routes())
        .merge(events::routes())
        .merge(webhooks::stripe::routes())
        .with_state(ctx_state.clone())
        .layer(TraceLayer::new_for_http())
}

async fn get_hc() -> Response {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    (StatusCode::OK, format!("v{}", VERSION)).into_response()
}
