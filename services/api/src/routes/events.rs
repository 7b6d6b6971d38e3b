//! Live change feed over Server-Sent Events

use std::convert::Infallible;

use axum::{
    Extension,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use booking::Session;
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};
use tracing::{info, warn};

use crate::state::AppState;

/// Stream the changes visible to the caller
///
/// The broadcast receiver is dropped with the response body, which ends the
/// subscription however the connection closes.
pub async fn stream_events(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("Live feed opened for account: {}", session.account_id);

    let stream = BroadcastStream::new(state.feed.subscribe()).filter_map(move |item| match item {
        Ok(event) => event.view_for(&session).and_then(|view| {
            Event::default()
                .event(view.name())
                .json_data(&view)
                .ok()
                .map(Ok)
        }),
        Err(e) => {
            warn!("Live feed for {} fell behind: {}", session.account_id, e);
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
