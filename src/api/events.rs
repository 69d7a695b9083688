//! SSE fan-out of dataset updates to remote admin tabs.

use std::convert::Infallible;

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use uuid::Uuid;

use crate::sync::UPDATE_TYPE;
use crate::AppState;

/// Query string for the event stream.
#[derive(Debug, Default, Deserialize)]
pub struct EventParams {
    /// The subscriber's own origin id; its updates are filtered out to
    /// prevent self-echo.
    #[serde(default)]
    pub origin: Option<Uuid>,
}

/// GET /api/admin/events - stream of dataset:update messages.
pub async fn subscribe_events(
    State(state): State<AppState>,
    Query(params): Query<EventParams>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.workspace.hub().subscribe();
    let origin = params.origin;

    let stream = BroadcastStream::new(rx).filter_map(move |message| {
        // Lagged subscribers skip the missed updates; force refresh recovers.
        let update = message.ok()?;
        if origin == Some(update.origin) {
            return None;
        }
        let event = Event::default()
            .event(UPDATE_TYPE)
            .json_data(&update)
            .ok()?;
        Some(Ok(event))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
