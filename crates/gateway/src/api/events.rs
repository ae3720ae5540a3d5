//! Server-sent status events.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream::Stream;

use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /v1/session/events
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Stream session status snapshots as `text/event-stream`.
///
/// The current snapshot is sent immediately so late subscribers do not have
/// to wait for the next transition. The subscription is taken before that
/// snapshot, so a transition racing the connect shows up as a duplicate
/// rather than a gap. Lagged subscribers skip what they missed and continue.
pub async fn session_events_sse(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>> {
    let mut rx = state.manager.subscribe();
    let initial = state.manager.status().await;

    let stream = async_stream::stream! {
        if let Ok(json) = serde_json::to_string(&initial) {
            yield Ok(Event::default().event("status").data(json));
        }
        loop {
            match rx.recv().await {
                Ok(snapshot) => {
                    if let Ok(json) = serde_json::to_string(&snapshot) {
                        yield Ok(Event::default().event("status").data(json));
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
