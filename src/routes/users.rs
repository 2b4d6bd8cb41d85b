use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::entities::user_auth::local_user_entity::{LocalUser, LocalUserDbService};
use crate::middleware;
use middleware::ctx::Ctx;
use middleware::error::{AppError, CtxResult};
use middleware::mw_ctx::CtxState;
use middleware::utils::extractor_utils::JsonOrFormValidated;

pub fn routes(is_development: bool) -> Router<Arc<CtxState>> {
    let mut router: Router<Arc<CtxState>> =
        Router::new().route("/api/users/me", get(get_current_user));

    if is_development {
        router = router.route("/test/api/users", post(create_test_user));
    }

    router
}

async fn get_current_user(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
) -> CtxResult<Json<LocalUser>> {
    let user = LocalUserDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .get_ctx_user()
    .await?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct TestUserInput {
    #[validate(length(min = 3, message = "Min 3 characters for username"))]
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub payout_account: Option<String>,
    pub creator_metrics: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TestUserResponse {
    pub id: String,
    pub token: String,
}

async fn create_test_user(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonOrFormValidated(input): JsonOrFormValidated<TestUserInput>,
) -> CtxResult<Json<TestUserResponse>> {
    if !state.is_development {
        return Err(ctx.to_ctx_error(AppError::Forbidden));
    }

    let user = LocalUserDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .create(LocalUser {
        id: None,
        username: input.username,
        full_name: input.full_name,
        email_verified: input.email,
        bio: None,
        image_uri: None,
        payout_account: input.payout_account,
        creator_metrics: input.creator_metrics,
    })
    .await?;

    let user_id = user.id.as_ref().unwrap().to_raw();
    let token = state
        .jwt
        .create_by_login(&user_id)
        .map_err(|e| ctx.to_ctx_error(e))?;

    Ok(Json(TestUserResponse { id: user_id, token }))
}
