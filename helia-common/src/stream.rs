//! Append-only output channel for streamed block content.
//!
//! A [`DataStream`] is the write half handed to document handlers; the
//! [`DataStreamReader`] is owned by whoever relays parts to the client.
//! Every `write` is delivered to the reader as soon as it returns, so there
//! is nothing to flush. `close` appends a single [`StreamPart::Finish`] and
//! rejects any later write. Handlers only write; the owner of the stream
//! closes it.

use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

use crate::kind::BlockKind;

/// One unit written into a data stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "kebab-case")]
pub enum StreamPart {
    Id(String),
    Title(String),
    Kind(BlockKind),
    Clear,
    TextDelta(String),
    CodeDelta(String),
    Finish,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    #[error("stream already closed")]
    Closed,
    #[error("stream reader dropped")]
    Disconnected,
}

/// Write side of a block content stream.
pub trait StreamSink: Send + Sync {
    fn write(&self, part: StreamPart) -> Result<(), StreamError>;

    /// Terminates the stream. Calling it again is a no-op.
    fn close(&self) -> Result<(), StreamError>;
}

#[derive(Debug, Clone)]
pub struct DataStream {
    tx: mpsc::UnboundedSender<StreamPart>,
    closed: Arc<AtomicBool>,
}

#[derive(Debug)]
pub struct DataStreamReader {
    rx: mpsc::UnboundedReceiver<StreamPart>,
    finished: bool,
}

/// Creates a connected writer/reader pair.
pub fn channel() -> (DataStream, DataStreamReader) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        DataStream {
            tx,
            closed: Arc::new(AtomicBool::new(false)),
        },
        DataStreamReader {
            rx,
            finished: false,
        },
    )
}

impl DataStream {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl StreamSink for DataStream {
    fn write(&self, part: StreamPart) -> Result<(), StreamError> {
        if self.is_closed() {
            return Err(StreamError::Closed);
        }
        self.tx.send(part).map_err(|_| StreamError::Disconnected)
    }

    fn close(&self) -> Result<(), StreamError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.tx
            .send(StreamPart::Finish)
            .map_err(|_| StreamError::Disconnected)
    }
}

impl DataStreamReader {
    /// Next part, or `None` once `Finish` was seen or every writer is gone.
    pub async fn next(&mut self) -> Option<StreamPart> {
        if self.finished {
            return None;
        }
        let part = self.rx.recv().await;
        match part {
            Some(StreamPart::Finish) | None => self.finished = true,
            Some(_) => {}
        }
        part
    }

    pub async fn collect(mut self) -> Vec<StreamPart> {
        let mut parts = Vec::new();
        while let Some(part) = self.next().await {
            parts.push(part);
        }
        parts
    }
}

/// Concatenates the text and code deltas of `parts`.
pub fn delta_text(parts: &[StreamPart]) -> String {
    parts
        .iter()
        .filter_map(|part| match part {
            StreamPart::TextDelta(delta) | StreamPart::CodeDelta(delta) => Some(delta.as_str()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reader_sees_writes_in_order_then_finish() {
        let (stream, reader) = channel();
        stream.write(StreamPart::Id("d1".into())).unwrap();
        stream.write(StreamPart::TextDelta("Hello ".into())).unwrap();
        stream.write(StreamPart::TextDelta("world".into())).unwrap();
        stream.close().unwrap();

        let parts = reader.collect().await;
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], StreamPart::Id("d1".into()));
        assert_eq!(parts.last(), Some(&StreamPart::Finish));
        assert_eq!(delta_text(&parts), "Hello world");
    }

    #[tokio::test]
    async fn writes_after_close_are_rejected() {
        let (stream, reader) = channel();
        stream.close().unwrap();
        assert_eq!(
            stream.write(StreamPart::TextDelta("late".into())),
            Err(StreamError::Closed)
        );
        // Closing twice does not emit a second Finish.
        stream.close().unwrap();
        drop(stream);
        assert_eq!(reader.collect().await, vec![StreamPart::Finish]);
    }

    #[tokio::test]
    async fn cloned_writers_share_close_state() {
        let (stream, _reader) = channel();
        let clone = stream.clone();
        stream.close().unwrap();
        assert!(clone.is_closed());
        assert_eq!(clone.write(StreamPart::Clear), Err(StreamError::Closed));
    }

    #[tokio::test]
    async fn dropping_all_writers_ends_the_stream() {
        let (stream, reader) = channel();
        stream.write(StreamPart::CodeDelta("fn main() {}".into())).unwrap();
        drop(stream);
        let parts = reader.collect().await;
        assert_eq!(parts, vec![StreamPart::CodeDelta("fn main() {}".into())]);
    }

    #[test]
    fn write_fails_when_reader_is_gone() {
        let (stream, reader) = channel();
        drop(reader);
        assert_eq!(
            stream.write(StreamPart::Clear),
            Err(StreamError::Disconnected)
        );
    }

    #[test]
    fn parts_serialize_with_type_tag() {
        let json = serde_json::to_value(StreamPart::TextDelta("hi".into())).unwrap();
        assert_eq!(json["type"], "text-delta");
        assert_eq!(json["content"], "hi");
        let json = serde_json::to_value(StreamPart::Kind(BlockKind::Code)).unwrap();
        assert_eq!(json["content"], "code");
    }
}
