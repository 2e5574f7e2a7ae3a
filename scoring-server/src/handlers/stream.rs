//! Live prediction feed (Server-Sent Events)
//!
//! Each event is one `{timestamp, fraud_probability}` point with the record id
//! as event id. A subscriber sending `Last-Event-ID` (or the `last_id` from
//! `/metrics`) gets every record after that id; otherwise it starts at the
//! current end of the log.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;

use crate::models::StreamPoint;
use crate::store::{PredictionLog, PredictionRecord};
use crate::AppState;

struct Tail {
    log: PredictionLog,
    last_id: i64,
    poll: Duration,
    pending: VecDeque<PredictionRecord>,
}

const LAST_EVENT_ID: &str = "last-event-id";

/// Parsed `Last-Event-ID`; unparsable values are treated as absent
fn resume_point(headers: &HeaderMap) -> Option<i64> {
    headers
        .get(LAST_EVENT_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
        .map(|id| id.max(0))
}

pub async fn subscribe(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let current = state.log.last_id().await;
    // An id from before a restart may be past the end; replay nothing then
    let last_id = match resume_point(&headers) {
        Some(id) => id.min(current),
        None => current,
    };
    tracing::info!(from_id = last_id, log_end = current, "Stream subscriber connected");

    let tail = Tail {
        log: state.log.clone(),
        last_id,
        poll: Duration::from_millis(state.config.stream_poll_ms.max(1)),
        pending: VecDeque::new(),
    };

    let events = futures::stream::unfold(tail, |mut tail| async move {
        loop {
            if let Some(record) = tail.pending.pop_front() {
                let point = StreamPoint {
                    timestamp: record.timestamp_label(),
                    fraud_probability: record.fraud_probability,
                };
                match Event::default().id(record.id.to_string()).json_data(&point) {
                    Ok(event) => return Some((Ok(event), tail)),
                    Err(e) => {
                        tracing::warn!(id = record.id, error = %e, "Failed to encode stream point");
                        continue;
                    }
                }
            }

            tokio::time::sleep(tail.poll).await;

            let fresh = tail.log.after(tail.last_id).await;
            if let Some(last) = fresh.last() {
                tail.last_id = last.id;
            }
            tail.pending.extend(fresh);
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
