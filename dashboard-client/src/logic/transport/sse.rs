//! SSE Decoding
//!
//! Parses a `text/event-stream` byte stream into [`MetricSample`] items.
//!
//! ```text
//! id: 41
//! data: {"timestamp":"2026-10-15T10:00:00","fraud_probability":0.12}
//!
//! : keep-alive
//!
//! ```
//!
//! The last `id` seen is kept in a [`StreamCursor`] so a reconnect can ask the
//! server to resume after it (`Last-Event-ID`).

use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use parking_lot::Mutex;

use super::error::TransportError;
use super::SampleStream;
use crate::logic::types::MetricSample;

// ============================================================================
// CURSOR
// ============================================================================

/// Id of the last event consumed, shared between a subscription and the
/// streams it opens
#[derive(Debug, Clone, Default)]
pub struct StreamCursor {
    last_event_id: Arc<Mutex<Option<String>>>,
}

impl StreamCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursor positioned after `id`, e.g. the log position a snapshot covers
    pub fn starting_after(id: impl ToString) -> Self {
        let cursor = Self::new();
        cursor.advance(id.to_string());
        cursor
    }

    pub fn get(&self) -> Option<String> {
        self.last_event_id.lock().clone()
    }

    pub fn advance(&self, id: impl Into<String>) {
        *self.last_event_id.lock() = Some(id.into());
    }
}

// ============================================================================
// DECODER
// ============================================================================

/// One dispatched event
#[derive(Debug, Clone, PartialEq)]
pub struct SseEvent {
    /// Last event id in effect when the event was dispatched
    pub id: Option<String>,
    pub data: String,
}

/// Incremental line decoder
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Vec<String>,
    last_id: Option<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw[..raw.len() - 1]);
            let line = line.strip_suffix('\r').unwrap_or(&line);

            if line.is_empty() {
                if !self.data.is_empty() {
                    events.push(SseEvent {
                        id: self.last_id.clone(),
                        data: self.data.join("\n"),
                    });
                    self.data.clear();
                }
                continue;
            }

            // Comment / keep-alive
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };

            match field {
                "data" => self.data.push(value.to_string()),
                // An id containing NUL is ignored
                "id" if !value.contains('\0') => self.last_id = Some(value.to_string()),
                // `event` and `retry` carry nothing we use
                _ => {}
            }
        }

        events
    }
}

/// Decode one event payload into a validated sample
pub fn parse_sample(data: &str) -> Result<MetricSample, TransportError> {
    let sample: MetricSample =
        serde_json::from_str(data).map_err(|e| TransportError::Parse(format!("{}: {}", e, data)))?;
    sample.check().map_err(TransportError::Malformed)?;
    Ok(sample)
}

/// Wrap a byte stream into a [`SampleStream`].
///
/// The cursor advances as each event is yielded, bad messages included. A read
/// error is yielded once as `Network` and ends the stream.
pub fn sample_stream<S, E>(bytes: S, cursor: StreamCursor) -> SampleStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display,
{
    struct State<S> {
        bytes: Pin<Box<S>>,
        decoder: SseDecoder,
        cursor: StreamCursor,
        ready: VecDeque<SseEvent>,
        done: bool,
    }

    let state = State {
        bytes: Box::pin(bytes),
        decoder: SseDecoder::new(),
        cursor,
        ready: VecDeque::new(),
        done: false,
    };

    Box::pin(stream::unfold(state, |mut st| async move {
        loop {
            if let Some(event) = st.ready.pop_front() {
                if let Some(id) = event.id {
                    st.cursor.advance(id);
                }
                return Some((parse_sample(&event.data), st));
            }
            if st.done {
                return None;
            }

            match st.bytes.next().await {
                Some(Ok(chunk)) => {
                    let events = st.decoder.push(&chunk);
                    st.ready.extend(events);
                }
                Some(Err(e)) => {
                    st.done = true;
                    return Some((Err(TransportError::Network(e.to_string())), st));
                }
                None => return None,
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(events: Vec<SseEvent>) -> Vec<String> {
        events.into_iter().map(|e| e.data).collect()
    }

    #[test]
    fn test_decoder_splits_events() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"data: {\"a\":1}\n\ndata: {\"a\":2}\n\n");
        assert_eq!(data(events), vec!["{\"a\":1}", "{\"a\":2}"]);
    }

    #[test]
    fn test_decoder_handles_partial_chunks_and_crlf() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: {\"times").is_empty());
        assert!(decoder.push(b"tamp\":\"T1\"}\r\n").is_empty());
        let events = decoder.push(b"\r\n");
        assert_eq!(data(events), vec!["{\"timestamp\":\"T1\"}"]);
    }

    #[test]
    fn test_decoder_skips_comments_and_other_fields() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b": ping\n\nevent: point\nid: 7\nretry: 100\ndata: x\n\n");
        assert_eq!(
            events,
            vec![SseEvent {
                id: Some("7".to_string()),
                data: "x".to_string()
            }]
        );
    }

    #[test]
    fn test_decoder_id_persists_until_replaced() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"data: a\n\nid: 3\ndata: b\n\ndata: c\n\nid: 4\n\ndata: d\n\n");

        let ids: Vec<Option<&str>> = events.iter().map(|e| e.id.as_deref()).collect();
        assert_eq!(ids, vec![None, Some("3"), Some("3"), Some("4")]);
    }

    #[test]
    fn test_decoder_joins_multiline_data() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"data: line1\ndata: line2\n\n");
        assert_eq!(data(events), vec!["line1\nline2"]);
    }

    #[test]
    fn test_parse_sample_validation() {
        assert_eq!(
            parse_sample(r#"{"timestamp":"T1","fraud_probability":0.4}"#).unwrap(),
            MetricSample::new("T1", 0.4)
        );
        assert!(matches!(parse_sample("not json"), Err(TransportError::Parse(_))));
        assert!(matches!(
            parse_sample(r#"{"timestamp":"T1","fraud_probability":3.0}"#),
            Err(TransportError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_sample_stream_in_order() {
        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"data: {\"timestamp\":\"T1\",\"fraud_probability\":0.1}\n\ndata: {\"timest")),
            Ok(Bytes::from_static(b"amp\":\"T2\",\"fraud_probability\":0.2}\n\n")),
            Ok(Bytes::from_static(b"data: oops\n\n")),
        ];

        let items: Vec<_> = sample_stream(stream::iter(chunks), StreamCursor::new()).collect().await;

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap().timestamp(), "T1");
        assert_eq!(items[1].as_ref().unwrap().timestamp(), "T2");
        assert!(items[2].as_ref().unwrap_err().is_bad_message());
    }

    #[tokio::test]
    async fn test_cursor_follows_consumed_events() {
        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![Ok(Bytes::from_static(
            b"id: 8\ndata: {\"timestamp\":\"T8\",\"fraud_probability\":0.1}\n\nid: 9\ndata: oops\n\n",
        ))];
        let cursor = StreamCursor::starting_after(7);
        let mut samples = sample_stream(stream::iter(chunks), cursor.clone());

        assert_eq!(cursor.get().as_deref(), Some("7"));
        assert!(samples.next().await.unwrap().is_ok());
        assert_eq!(cursor.get().as_deref(), Some("8"));
        // Skipped messages still move the cursor
        assert!(samples.next().await.unwrap().is_err());
        assert_eq!(cursor.get().as_deref(), Some("9"));
    }

    #[tokio::test]
    async fn test_sample_stream_ends_after_read_error() {
        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"data: {\"timestamp\":\"T1\",\"fraud_probability\":0.1}\n\n")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
            Ok(Bytes::from_static(b"data: {\"timestamp\":\"T2\",\"fraud_probability\":0.1}\n\n")),
        ];

        let items: Vec<_> = sample_stream(stream::iter(chunks), StreamCursor::new()).collect().await;

        assert_eq!(items.len(), 2);
        assert!(matches!(items[1], Err(TransportError::Network(_))));
    }
}
