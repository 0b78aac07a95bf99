//! Stream driver
//!
//! Adapts an abstract text stream (an LLM response body) to parser events.

use async_stream::stream;
use futures::{Stream, StreamExt};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::block::{ContentBlock, PendingBlock};
use super::parser::StreamParser;

/// Why the stream ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The source ended normally
    Completed,
    /// The cancellation token fired
    Cancelled,
}

/// Events emitted while driving a stream
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A block was finalized
    Block { block: ContentBlock },
    /// The unfinished tail changed
    Pending { pending: PendingBlock },
    /// The transport or the parser failed; no more events follow
    Failed { error: String },
    /// The stream ended; carries every finalized block
    Finished {
        reason: FinishReason,
        blocks: Vec<ContentBlock>,
    },
}

/// Drive `source` through `parser` until it ends, fails or is cancelled.
///
/// Cancellation and failure abort the parser: blocks finalized so far are
/// kept, nothing from an open fence is emitted. On cancellation, complete
/// prose lines are flushed as a final `Block` before `Finished`.
pub fn drive<S, E>(
    source: S,
    mut parser: StreamParser,
    cancel: CancellationToken,
) -> impl Stream<Item = StreamEvent>
where
    S: Stream<Item = Result<String, E>>,
    E: std::fmt::Display,
{
    stream! {
        let mut source = std::pin::pin!(source);
        let mut last_pending: Option<PendingBlock> = None;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                item = source.next() => Some(item),
            };

            let item = match next {
                None => {
                    tracing::debug!("stream cancelled");
                    let flushed = parser.abort().to_vec();
                    for block in flushed {
                        yield StreamEvent::Block { block };
                    }
                    yield StreamEvent::Finished {
                        reason: FinishReason::Cancelled,
                        blocks: parser.blocks().to_vec(),
                    };
                    return;
                }
                Some(item) => item,
            };

            match item {
                Some(Ok(chunk)) => {
                    let emitted = match parser.push(&chunk) {
                        Ok(blocks) => blocks.to_vec(),
                        Err(err) => {
                            tracing::warn!(error = %err, "stream parser rejected chunk");
                            parser.abort();
                            yield StreamEvent::Failed { error: err.to_string() };
                            return;
                        }
                    };
                    for block in emitted {
                        yield StreamEvent::Block { block };
                    }
                    let pending = parser.pending();
                    if pending != last_pending {
                        if let Some(pending) = pending.clone() {
                            yield StreamEvent::Pending { pending };
                        }
                        last_pending = pending;
                    }
                }
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "text stream failed");
                    parser.abort();
                    yield StreamEvent::Failed { error: err.to_string() };
                    return;
                }
                None => {
                    let emitted = match parser.finish() {
                        Ok(blocks) => blocks.to_vec(),
                        Err(err) => {
                            yield StreamEvent::Failed { error: err.to_string() };
                            return;
                        }
                    };
                    for block in emitted {
                        yield StreamEvent::Block { block };
                    }
                    yield StreamEvent::Finished {
                        reason: FinishReason::Completed,
                        blocks: parser.into_blocks(),
                    };
                    return;
                }
            }
        }
    }
}
