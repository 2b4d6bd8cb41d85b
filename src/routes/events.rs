use std::convert::Infallible;
use std::sync::Arc;

use crate::{
    entities::user_auth::local_user_entity::LocalUserDbService,
    middleware::{ctx::Ctx, error::CtxResult, mw_ctx::CtxState},
};
use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive},
        Sse,
    },
    routing::get,
    Router,
};
use futures::Stream;
use serde_json::json;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new().route("/api/events", get(get_events))
}

/// Live notification feed for the logged-in user. Every broadcast event names
/// its receivers; everyone else's events are dropped here, not client-side.
async fn get_events(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
) -> CtxResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let user_id = LocalUserDbService {
        db: &state.db.client,
        ctx: &ctx,
    }
    .get_ctx_user_thing()
    .await?
    .to_raw();

    let stream = BroadcastStream::new(state.event_sender.subscribe()).filter_map(move |msg| {
        match msg {
            Ok(event) if event.receivers.contains(&user_id) => {
                Some(Ok(Event::default().data(json!(event).to_string())))
            }
            // lagged receivers and foreign events are skipped, the stream stays up
            _ => None,
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
