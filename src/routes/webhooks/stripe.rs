use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;

use crate::entities::contest::contest_entity::ContestDbService;
use crate::middleware;
use crate::middleware::error::AppError;
use crate::middleware::mw_ctx::CtxState;
use crate::middleware::utils::extractor_utils::extract_stripe_event;
use crate::middleware::utils::string_utils::get_str_thing;
use crate::services::notification_service::NotificationService;
use middleware::ctx::Ctx;
use middleware::error::CtxResult;

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new().route("/__stripe/webhook", post(handle_webhook))
}

async fn handle_webhook(
    ctx: Ctx,
    State(state): State<Arc<CtxState>>,
    req: Request<Body>,
) -> CtxResult<Response> {
    let event = extract_stripe_event(req, &state).await?;

    let payment_intent = match event.type_ {
        stripe::EventType::PaymentIntentSucceeded => {
            if let stripe::EventObject::PaymentIntent(payment_intent) = event.data.object {
                Some(payment_intent)
            } else {
                None
            }
        }
        _ => {
            if state.is_development {
                tracing::debug!("Unknown event encountered in webhook: {:?}", event.type_);
            }
            None
        }
    };

    let Some(payment_intent) = payment_intent else {
        return Ok("No valid data to process".into_response());
    };

    let amount_received = payment_intent.amount_received;
    if amount_received <= 0 {
        return Ok("No amount received".into_response());
    }

    let contest_id = payment_intent
        .metadata
        .get("contest_id")
        .ok_or(AppError::Generic {
            description: "contest id not found in payment metadata".to_string(),
        })?;
    let contest_thing = get_str_thing(contest_id)?;

    let contests_repository = ContestDbService {
        db: &state.db.client,
        ctx: &ctx,
    };

    contests_repository
        .add_funded_amount(&contest_thing, amount_received)
        .await?;

    if let Some(user_id) = payment_intent.metadata.get("user_id") {
        if let Ok(brand) = get_str_thing(user_id) {
            let notification_service = NotificationService::new(
                &ctx,
                &state.event_sender,
                &state.db.user_notifications,
            );
            let _ = notification_service
                .on_contest_funded(&brand, &contest_thing, amount_received)
                .await;
        }
    }

    Ok("Full payment processed".into_response())
}
