use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use stripe::{AccountId, Client, CreatePaymentIntent, Currency};
use validator::Validate;

use crate::entities::contest::contest_entity::ContestDbService;
use crate::middleware;
use middleware::ctx::Ctx;
use middleware::error::{AppError, CtxResult};
use middleware::mw_ctx::CtxState;
use middleware::utils::db_utils::IdentIdName;
use middleware::utils::extractor_utils::JsonOrFormValidated;
use middleware::utils::string_utils::get_str_thing;

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new().route("/api/contests/:contest_id/fund", post(fund_contest))
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct FundContestInput {
    #[validate(range(min = 100))]
    pub amount: u64,
}

/// Creates the payment intent the brand pays to cover the prize budget. The
/// funds land on the platform account and sit there until settlement; the
/// webhook credits the contest when the payment succeeds.
async fn fund_contest(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(contest_id): Path<String>,
    JsonOrFormValidated(data): JsonOrFormValidated<FundContestInput>,
) -> CtxResult<Json<String>> {
    let user_thing = ctx.user_thing()?;
    let contest_thing = get_str_thing(&contest_id)?;

    let contest = ContestDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .get(IdentIdName::Id(contest_thing.clone()))
    .await?;

    if contest.created_by != user_thing {
        return Err(ctx.to_ctx_error(AppError::Forbidden));
    }

    let acc_id = AccountId::from_str(state.stripe_platform_account.as_str()).map_err(|e| {
        AppError::Stripe {
            source: e.to_string(),
        }
    })?;
    let client = Client::new(state.stripe_secret_key.clone()).with_stripe_account(acc_id);

    let amt = data.amount as i64;

    let mut metadata = HashMap::with_capacity(3);
    metadata.insert("contest_id".to_string(), contest_thing.to_raw());
    metadata.insert("user_id".to_string(), user_thing.to_raw());
    metadata.insert("action".to_string(), "contest_funding".to_string());

    let create_pi = CreatePaymentIntent {
        amount: amt,
        currency: Currency::USD,
        metadata: Some(metadata),
        on_behalf_of: None,
        transfer_data: None,
        application_fee_amount: None,
        automatic_payment_methods: None,
        capture_method: None,
        confirm: Some(false),
        customer: None,
        description: None,
        payment_method: None,
        receipt_email: None,
        return_url: None,
        setup_future_usage: None,
        shipping: None,
        statement_descriptor: None,
        statement_descriptor_suffix: None,
        transfer_group: None,
        use_stripe_sdk: None,
        mandate: None,
        mandate_data: None,
        off_session: None,
        payment_method_options: None,
        payment_method_types: None,
        confirmation_method: None,
        error_on_requires_action: None,
        expand: &[],
        payment_method_configuration: None,
        payment_method_data: None,
        radar_options: None,
    };

    let payment_intent =
        stripe::PaymentIntent::create(&client, create_pi)
            .await
            .map_err(|e| AppError::Stripe {
                source: e.to_string(),
            })?;

    Ok(Json(payment_intent.client_secret.unwrap()))
}
