use crate::{ChatCompletionChunk, CompletionError};
use bytes::Bytes;
use futures_util::Stream;
use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Represents a single SSE event with both raw bytes and parsed content
#[derive(Debug, Clone, serde::Serialize)]
pub struct SSEEvent {
    /// The raw bytes of this SSE event, including field prefixes and the blank-line terminator
    #[serde(skip)]
    pub raw_bytes: Bytes,
    /// The parsed chunk; `None` for comments, keep-alives and the `[DONE]` marker
    pub chunk: Option<ChatCompletionChunk>,
}

impl SSEEvent {
    /// True for the `data: [DONE]` terminator
    pub fn is_done(&self) -> bool {
        self.chunk.is_none()
            && event_data(&String::from_utf8_lossy(&self.raw_bytes)).as_deref() == Some("[DONE]")
    }
}

/// SSE (Server-Sent Events) stream parser that buffers incomplete events across
/// HTTP chunks and yields one item per complete event.
///
/// Every byte received from the inner stream ends up in exactly one emitted event,
/// so concatenating `raw_bytes` reproduces the provider stream. The exceptions are
/// error payloads, which are surfaced as `Err` and end the stream.
pub struct SSEParser<S> {
    inner: S,
    buffer: Vec<u8>,
    pending: VecDeque<Result<SSEEvent, CompletionError>>,
    finished: bool,
}

impl<S, E> SSEParser<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    pub fn new(stream: S) -> Self {
        Self {
            inner: stream,
            buffer: Vec::new(),
            pending: VecDeque::new(),
            finished: false,
        }
    }

    fn process_buffer(&mut self) {
        while let Some(end) = find_event_boundary(&self.buffer) {
            let raw: Vec<u8> = self.buffer.drain(..end).collect();
            if !self.push_event(Bytes::from(raw)) {
                return;
            }
        }
    }

    /// Queue one complete event. Returns false once the stream has been terminated by
    /// an error payload.
    fn push_event(&mut self, raw_bytes: Bytes) -> bool {
        match parse_event(&raw_bytes) {
            Ok(chunk) => {
                self.pending.push_back(Ok(SSEEvent { raw_bytes, chunk }));
                true
            }
            Err(e) => {
                tracing::warn!("Provider reported an error inside the stream: {}", e);
                self.pending.push_back(Err(e));
                self.finished = true;
                self.buffer.clear();
                false
            }
        }
    }
}

impl<S, E> Stream for SSEParser<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    type Item = Result<SSEEvent, CompletionError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Poll::Ready(Some(item));
            }
            if self.finished {
                return Poll::Ready(None);
            }

            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    self.buffer.extend_from_slice(&bytes);
                    self.process_buffer();
                }
                Poll::Ready(Some(Err(e))) => {
                    // Partial event data is dropped; nothing half-received is emitted
                    self.finished = true;
                    self.buffer.clear();
                    return Poll::Ready(Some(Err(CompletionError::StreamError(e.to_string()))));
                }
                Poll::Ready(None) => {
                    self.finished = true;
                    if !self.buffer.is_empty() {
                        tracing::debug!(
                            "Flushing {} trailing bytes without event terminator",
                            self.buffer.len()
                        );
                        let raw = std::mem::take(&mut self.buffer);
                        self.push_event(Bytes::from(raw));
                    }
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Create a new SSE parser over a provider byte stream
pub fn new_sse_parser<S, E>(stream: S) -> SSEParser<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    SSEParser::new(stream)
}

/// Index one past the blank line that terminates the first event in `buf`
fn find_event_boundary(buf: &[u8]) -> Option<usize> {
    let mut i = 0;
    while i < buf.len() {
        if buf[i] == b'\n' {
            let rest = &buf[i + 1..];
            if rest.starts_with(b"\n") {
                return Some(i + 2);
            }
            if rest.starts_with(b"\r\n") {
                return Some(i + 3);
            }
        }
        i += 1;
    }
    None
}

/// Joined `data:` field values of an event, if it has any
fn event_data(text: &str) -> Option<String> {
    let data: Vec<&str> = text
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|value| value.strip_prefix(' ').unwrap_or(value))
        .collect();

    if data.is_empty() {
        None
    } else {
        Some(data.join("\n"))
    }
}

fn parse_event(raw: &[u8]) -> Result<Option<ChatCompletionChunk>, CompletionError> {
    let text = String::from_utf8_lossy(raw);
    let Some(data) = event_data(&text) else {
        // Comments (": OPENROUTER PROCESSING") and keep-alives
        return Ok(None);
    };

    let data = data.trim();
    if data.is_empty() || data == "[DONE]" {
        return Ok(None);
    }

    let json: serde_json::Value = match serde_json::from_str(data) {
        Ok(json) => json,
        Err(_) => {
            tracing::warn!("Relaying SSE event with non-JSON data");
            return Ok(None);
        }
    };

    if let Some(error) = json.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(match error.get("code").and_then(|c| c.as_u64()) {
            Some(code) if (400..600).contains(&code) => CompletionError::HttpError {
                status_code: code as u16,
                message,
            },
            _ => CompletionError::StreamError(message),
        });
    }

    match serde_json::from_value::<ChatCompletionChunk>(json) {
        Ok(chunk) => Ok(Some(chunk)),
        Err(e) => {
            tracing::warn!("Relaying SSE event that is not a chat chunk: {}", e);
            Ok(None)
        }
    }
}
