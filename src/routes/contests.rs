use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::contest::application_entity::{
    ApplicationStatus, ApplicationView, ContestApplication,
};
use crate::entities::contest::contest_entity::{Contest, ContestDbService, ContestStatus};
use crate::middleware;
use crate::services::contest_service::{ContestInput, ContestService};
use middleware::ctx::Ctx;
use middleware::error::CtxResult;
use middleware::mw_ctx::CtxState;
use middleware::utils::db_utils::{IdentIdName, Pagination, QryOrder};
use middleware::utils::extractor_utils::JsonOrFormValidated;

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/contests", post(create_contest).get(user_contests))
        .route("/api/contests/:contest_id", get(get_contest))
        .route("/api/contests/:contest_id/status", post(set_contest_status))
        .route("/api/contests/:contest_id/apply", post(apply_to_contest))
        .route(
            "/api/contests/:contest_id/applications",
            get(contest_applications),
        )
        .route(
            "/api/applications/:application_id/status",
            post(set_application_status),
        )
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ContestStatusInput {
    pub status: ContestStatus,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ApplyInput {
    #[validate(url(message = "post_url must be a valid url"))]
    pub post_url: String,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ApplicationStatusInput {
    pub status: ApplicationStatus,
}

#[derive(Debug, Deserialize)]
struct ApplicationsQuery {
    status: Option<ApplicationStatus>,
}

async fn create_contest(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonOrFormValidated(input): JsonOrFormValidated<ContestInput>,
) -> CtxResult<Json<Contest>> {
    let contest_service = ContestService::new(
        &state.db.client,
        &ctx,
        &state.event_sender,
        &state.db.user_notifications,
    );

    let contest = contest_service.create(&ctx.user_id()?, input).await?;
    Ok(Json(contest))
}

async fn user_contests(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
) -> CtxResult<Json<Vec<Contest>>> {
    let user_thing = ctx.user_thing()?;
    let list = ContestDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .get_by_creator(
        &user_thing,
        Some(Pagination {
            order_by: Some("created_at".to_string()),
            order_dir: Some(QryOrder::DESC),
            count: 50,
            start: 0,
        }),
    )
    .await?;
    Ok(Json(list))
}

async fn get_contest(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(contest_id): Path<String>,
) -> CtxResult<Json<Contest>> {
    let contest_thing = middleware::utils::string_utils::get_str_thing(&contest_id)?;
    let contest = ContestDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .get(IdentIdName::Id(contest_thing))
    .await?;
    Ok(Json(contest))
}

async fn set_contest_status(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(contest_id): Path<String>,
    JsonOrFormValidated(input): JsonOrFormValidated<ContestStatusInput>,
) -> CtxResult<Json<Contest>> {
    let contest_service = ContestService::new(
        &state.db.client,
        &ctx,
        &state.event_sender,
        &state.db.user_notifications,
    );

    let contest = contest_service
        .set_status(&ctx.user_id()?, &contest_id, input.status)
        .await?;
    Ok(Json(contest))
}

async fn apply_to_contest(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(contest_id): Path<String>,
    JsonOrFormValidated(input): JsonOrFormValidated<ApplyInput>,
) -> CtxResult<Json<ContestApplication>> {
    let contest_service = ContestService::new(
        &state.db.client,
        &ctx,
        &state.event_sender,
        &state.db.user_notifications,
    );

    let application = contest_service
        .apply(&ctx.user_id()?, &contest_id, input.post_url)
        .await?;
    Ok(Json(application))
}

async fn contest_applications(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(contest_id): Path<String>,
    Query(query): Query<ApplicationsQuery>,
) -> CtxResult<Json<Vec<ApplicationView>>> {
    let contest_service = ContestService::new(
        &state.db.client,
        &ctx,
        &state.event_sender,
        &state.db.user_notifications,
    );

    let list = contest_service
        .get_applications(&ctx.user_id()?, &contest_id, query.status)
        .await?;
    Ok(Json(list))
}

async fn set_application_status(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(application_id): Path<String>,
    JsonOrFormValidated(input): JsonOrFormValidated<ApplicationStatusInput>,
) -> CtxResult<Json<ContestApplication>> {
    let contest_service = ContestService::new(
        &state.db.client,
        &ctx,
        &state.event_sender,
        &state.db.user_notifications,
    );

    let application = contest_service
        .set_application_status(&ctx.user_id()?, &application_id, input.status)
        .await?;
    Ok(Json(application))
}
