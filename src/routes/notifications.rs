use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::entities::user_notification::UserNotification;
use crate::interfaces::repositories::user_notifications::UserNotificationsInterface;
use crate::middleware;
use middleware::ctx::Ctx;
use middleware::error::CtxResult;
use middleware::mw_ctx::CtxState;

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/notifications", get(get_notifications))
        .route("/api/notifications/:notification_id/read", post(mark_read))
}

async fn get_notifications(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
) -> CtxResult<Json<Vec<UserNotification>>> {
    let user_id = ctx.user_id()?;
    let list = state
        .db
        .user_notifications
        .get_by_user(&user_id)
        .await
        .map_err(|e| ctx.to_ctx_error(e))?;
    Ok(Json(list))
}

async fn mark_read(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(notification_id): Path<String>,
) -> CtxResult<()> {
    let user_id = ctx.user_id()?;
    // ownership check before the write
    let notification = state
        .db
        .user_notifications
        .get_by_id(&notification_id, &user_id)
        .await
        .map_err(|e| ctx.to_ctx_error(e))?;

    state
        .db
        .user_notifications
        .mark_read(&notification.id)
        .await
        .map_err(|e| ctx.to_ctx_error(e))?;

    Ok(())
}
