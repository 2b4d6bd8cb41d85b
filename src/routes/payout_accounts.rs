use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::user_auth::local_user_entity::LocalUserDbService;
use crate::middleware;
use middleware::ctx::Ctx;
use middleware::error::{AppError, CtxResult};
use middleware::mw_ctx::CtxState;
use middleware::utils::extractor_utils::JsonOrFormValidated;

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/payout_account", post(create_payout_account))
        .route("/api/payout_account/onboarding_link", post(onboarding_link))
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreatePayoutAccountInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 2, max = 2, message = "two-letter country code"))]
    pub country: String,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct OnboardingLinkInput {
    #[validate(url)]
    pub refresh_url: String,
    #[validate(url)]
    pub return_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PayoutAccountResponse {
    pub account: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OnboardingLinkResponse {
    pub url: String,
}

async fn create_payout_account(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonOrFormValidated(input): JsonOrFormValidated<CreatePayoutAccountInput>,
) -> CtxResult<Json<PayoutAccountResponse>> {
    let users_repository = LocalUserDbService {
        db: &state.db.client,
        ctx: &ctx,
    };
    let user = users_repository.get_ctx_user().await?;

    if user.payout_account.is_some() {
        return Err(ctx.to_ctx_error(AppError::Generic {
            description: "Payout account already exists".to_string(),
        }));
    }

    let account = state
        .payment
        .create_recipient_account(&input.email, &input.country)
        .await
        .map_err(|e| ctx.to_ctx_error(AppError::Stripe { source: e }))?;

    users_repository
        .set_payout_account(user.id.as_ref().unwrap(), &account.id)
        .await?;

    Ok(Json(PayoutAccountResponse {
        account: account.id,
    }))
}

async fn onboarding_link(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonOrFormValidated(input): JsonOrFormValidated<OnboardingLinkInput>,
) -> CtxResult<Json<OnboardingLinkResponse>> {
    let user = LocalUserDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .get_ctx_user()
    .await?;

    let account = user.payout_account.ok_or(ctx.to_ctx_error(AppError::Generic {
        description: "No payout account to onboard".to_string(),
    }))?;

    let link = state
        .payment
        .recipient_link(&account, &input.refresh_url, &input.return_url)
        .await
        .map_err(|e| ctx.to_ctx_error(AppError::Stripe { source: e }))?;

    Ok(Json(OnboardingLinkResponse { url: link.url }))
}
