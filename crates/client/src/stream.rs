//! SSE event stream support for the Parley client.
//!
//! Parses the `/v1/stream` response line-by-line into SSE frames and
//! yields decoded [`ChatEvent`]s, lagged notices, and keep-alives.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::StreamExt;
use futures::stream::Stream;
use tokio::io::AsyncBufReadExt;
use tokio_util::io::StreamReader;

use parley_core::ChatEvent;

use crate::Error;

/// A single SSE frame received from the server.
#[derive(Debug, Clone)]
pub struct SseFrame {
    /// The SSE event type (from `event:` line).
    pub event: Option<String>,
    /// The event ID (from `id:` line).
    pub id: Option<String>,
    /// The event data (from `data:` line(s)).
    pub data: String,
}

/// An item yielded by the [`EventStream`].
#[derive(Debug)]
pub enum StreamItem {
    /// A decoded event from the server.
    Event(Box<ChatEvent>),
    /// The server indicated the client missed events due to backpressure.
    /// History should be re-fetched.
    Lagged {
        /// Number of events that were skipped.
        skipped: u64,
    },
    /// A keep-alive comment was received (stream is still alive).
    KeepAlive,
}

/// An async stream of SSE events from the Parley server.
///
/// Created via [`ParleyClient::stream`](crate::ParleyClient::stream).
/// Implements `futures::Stream<Item = Result<StreamItem, Error>>`.
pub struct EventStream {
    inner: Pin<Box<dyn Stream<Item = Result<StreamItem, Error>> + Send>>,
}

impl Stream for EventStream {
    type Item = Result<StreamItem, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

/// Create an `EventStream` from a reqwest response that returns SSE data.
pub(crate) fn event_stream_from_response(response: reqwest::Response) -> EventStream {
    let byte_stream = response.bytes_stream();
    let reader = StreamReader::new(byte_stream.map(|result| result.map_err(std::io::Error::other)));
    let lines = tokio::io::BufReader::new(reader).lines();

    let stream = futures::stream::unfold(
        (lines, SseFrameState::default()),
        |(mut lines, mut frame_state)| async move {
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if line.is_empty() {
                            // Blank line = end of SSE frame.
                            if let Some(frame) = frame_state.take_frame() {
                                let item = parse_sse_frame(&frame);
                                return Some((item, (lines, frame_state)));
                            }
                            // Empty frame (e.g., double newline), skip.
                            continue;
                        }

                        if line.starts_with(':') {
                            // SSE comment (keep-alive).
                            let item = Ok(StreamItem::KeepAlive);
                            return Some((item, (lines, frame_state)));
                        }

                        if let Some(value) = line.strip_prefix("event:") {
                            frame_state.event = Some(value.trim().to_string());
                        } else if let Some(value) = line.strip_prefix("data:") {
                            frame_state.push_data(value.trim());
                        } else if let Some(value) = line.strip_prefix("id:") {
                            frame_state.id = Some(value.trim().to_string());
                        }
                        // Ignore unknown fields per SSE spec.
                    }
                    Ok(None) => {
                        // Stream ended.
                        return None;
                    }
                    Err(e) => {
                        return Some((
                            Err(Error::Connection(format!("SSE stream error: {e}"))),
                            (lines, frame_state),
                        ));
                    }
                }
            }
        },
    );

    EventStream {
        inner: Box::pin(stream),
    }
}

/// Intermediate state for parsing SSE frames line-by-line.
#[derive(Default)]
struct SseFrameState {
    event: Option<String>,
    id: Option<String>,
    data: Vec<String>,
}

impl SseFrameState {
    fn push_data(&mut self, line: &str) {
        self.data.push(line.to_string());
    }

    fn take_frame(&mut self) -> Option<SseFrame> {
        if self.data.is_empty() && self.event.is_none() && self.id.is_none() {
            return None;
        }
        let frame = SseFrame {
            event: self.event.take(),
            id: self.id.take(),
            data: std::mem::take(&mut self.data).join("\n"),
        };
        Some(frame)
    }
}

/// Parse an SSE frame into a `StreamItem`.
fn parse_sse_frame(frame: &SseFrame) -> Result<StreamItem, Error> {
    let event_type = frame.event.as_deref().unwrap_or("message");

    if event_type == "lagged" {
        let skipped = serde_json::from_str::<serde_json::Value>(&frame.data)
            .ok()
            .and_then(|v| v.get("skipped")?.as_u64())
            .unwrap_or(0);
        Ok(StreamItem::Lagged { skipped })
    } else {
        let event: ChatEvent = serde_json::from_str(&frame.data)
            .map_err(|e| Error::Deserialization(format!("failed to parse SSE event: {e}")))?;
        Ok(StreamItem::Event(Box::new(event)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{ChatEventKind, Message, MessageId, Username};

    fn delivered_frame() -> SseFrame {
        let event = ChatEvent::message_delivered(Message {
            id: MessageId::new("m1"),
            sender_username: Username::new("alice"),
            receiver_username: Username::new("bob"),
            message_text: Some("hi".into()),
            file: None,
            timestamp: chrono::Utc::now(),
        });
        SseFrame {
            event: Some(event.type_tag().to_owned()),
            id: Some(event.id.clone()),
            data: serde_json::to_string(&event).unwrap(),
        }
    }

    #[test]
    fn delivered_frame_parses_to_event() {
        let item = parse_sse_frame(&delivered_frame()).unwrap();
        let StreamItem::Event(event) = item else {
            panic!("expected an event item");
        };
        let ChatEventKind::MessageDelivered { message } = event.kind;
        assert_eq!(message.id, MessageId::new("m1"));
        assert_eq!(message.message_text.as_deref(), Some("hi"));
    }

    #[test]
    fn lagged_frame_parses_skip_count() {
        let frame = SseFrame {
            event: Some("lagged".to_owned()),
            id: None,
            data: r#"{"skipped":7}"#.to_owned(),
        };
        let item = parse_sse_frame(&frame).unwrap();
        assert!(matches!(item, StreamItem::Lagged { skipped: 7 }));
    }

    #[test]
    fn garbage_data_is_a_deserialization_error() {
        let frame = SseFrame {
            event: Some("message_delivered".to_owned()),
            id: None,
            data: "not json".to_owned(),
        };
        assert!(matches!(
            parse_sse_frame(&frame),
            Err(Error::Deserialization(_))
        ));
    }

    #[test]
    fn frame_state_joins_multiline_data() {
        let mut state = SseFrameState::default();
        state.event = Some("message_delivered".to_owned());
        state.push_data("line one");
        state.push_data("line two");
        let frame = state.take_frame().unwrap();
        assert_eq!(frame.data, "line one\nline two");
        // State is reset after taking a frame.
        assert!(state.take_frame().is_none());
    }
}
