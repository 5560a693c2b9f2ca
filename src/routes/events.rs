use std::convert::Infallible;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};

use crate::{middleware::auth::AuthUser, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(subscribe))
}

/// Server-sent change feed. Each event is named after the collection that
/// changed and carries the full change payload as JSON.
#[utoipa::path(
    get,
    path = "/api/events",
    responses(
        (status = 200, description = "SSE stream of data changes", content_type = "text/event-stream")
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
pub async fn subscribe(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.events.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| {
        // Lagged receivers just skip; the next event resyncs the client.
        let change = msg.ok()?;
        let event = Event::default()
            .event(change.collection.as_str())
            .json_data(&change)
            .ok()?;
        Some(Ok::<_, Infallible>(event))
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
