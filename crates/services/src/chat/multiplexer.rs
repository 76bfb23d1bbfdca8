//! Prepends the web search metadata line to the provider's byte stream.

use super::state::{PipelineRun, PipelineState};
use crate::web_search::WebSearchResult;
use bytes::Bytes;
use futures::Stream;
use serde::Serialize;
use std::fmt::Display;
use std::pin::Pin;
use std::task::{Context, Poll};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MetadataPayload<'a> {
    web_search_sources: &'a WebSearchResult,
    is_web_search: bool,
}

#[derive(Serialize)]
struct MetadataFrame<'a> {
    metadata: MetadataPayload<'a>,
}

/// Encode the single newline-terminated metadata line sent ahead of the answer
pub fn encode_metadata_frame(result: &WebSearchResult) -> Result<Bytes, serde_json::Error> {
    let frame = MetadataFrame {
        metadata: MetadataPayload {
            web_search_sources: result,
            is_web_search: true,
        },
    };
    let mut line = serde_json::to_vec(&frame)?;
    line.push(b'\n');
    Ok(Bytes::from(line))
}

/// Relays upstream chunks unchanged, optionally after one metadata frame.
///
/// The frame is yielded before upstream is polled. The stream ends after the first
/// upstream error. Dropping it drops upstream, which closes the provider connection.
pub struct MultiplexStream<S> {
    upstream: S,
    metadata: Option<Bytes>,
    run: Option<PipelineRun>,
    relayed_chunks: usize,
    finished: bool,
}

impl<S> MultiplexStream<S> {
    pub fn new(upstream: S, metadata: Option<Bytes>) -> Self {
        Self {
            upstream,
            metadata,
            run: None,
            relayed_chunks: 0,
            finished: false,
        }
    }

    pub fn passthrough(upstream: S) -> Self {
        Self::new(upstream, None)
    }

    /// Attach the pipeline run so the end of the stream is recorded on it
    pub fn with_run(mut self, run: PipelineRun) -> Self {
        self.run = Some(run);
        self
    }

    pub fn run_state(&self) -> Option<PipelineState> {
        self.run.as_ref().map(PipelineRun::state)
    }
}

impl<S, E> Stream for MultiplexStream<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    type Item = Result<Bytes, E>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        if this.finished {
            return Poll::Ready(None);
        }

        if let Some(frame) = this.metadata.take() {
            return Poll::Ready(Some(Ok(frame)));
        }

        match Pin::new(&mut this.upstream).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.relayed_chunks += 1;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(error))) => {
                this.finished = true;
                tracing::error!(
                    relayed_chunks = this.relayed_chunks,
                    "Upstream failed mid-stream: {}",
                    error
                );
                if let Some(run) = this.run.as_mut() {
                    run.fail(&error);
                }
                Poll::Ready(Some(Err(error)))
            }
            Poll::Ready(None) => {
                this.finished = true;
                tracing::debug!(
                    relayed_chunks = this.relayed_chunks,
                    "Upstream stream completed"
                );
                if let Some(run) = this.run.as_mut() {
                    run.advance(PipelineState::Done);
                }
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<S> Drop for MultiplexStream<S> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::info!(
                run_id = ?self.run.as_ref().map(PipelineRun::id),
                relayed_chunks = self.relayed_chunks,
                "Client disconnected before stream completed"
            );
        }
    }
}
