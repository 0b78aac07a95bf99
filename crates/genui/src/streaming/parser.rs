//! Incremental content-block parser
//!
//! Scans a growing text buffer for prose, ```json fences and ```jsx fences.
//! Decisions are only made on complete lines, so the blocks produced do not
//! depend on how the text was chunked. A finalized block is never revisited.

use genui_a2ui::node::ParseErrorKind;
use genui_a2ui::protocol::is_envelope;
use serde_json::Value;
use thiserror::Error;

use super::block::{ContentBlock, FenceKind, PendingBlock};
use super::tolerant_json::parse_tolerant_json;
use super::utf8::Utf8ChunkDecoder;
use crate::jsx::parse_jsx;

/// Default buffer limit (4 MiB)
pub const DEFAULT_MAX_BUFFER_BYTES: usize = 4 * 1024 * 1024;

/// Open json fences larger than this get no tolerant preview (256 KiB)
pub const MAX_PREVIEW_BYTES: usize = 256 * 1024;

const FENCE: &str = "```";

/// Parser errors. Only raised at API boundaries; content problems become
/// [`ContentBlock::Error`] instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParserError {
    #[error("buffer limit of {limit} bytes exceeded ({attempted} bytes)")]
    BufferLimitExceeded { limit: usize, attempted: usize },

    #[error("input does not extend the {received} bytes already received")]
    NonMonotonicInput { received: usize },

    #[error("parser already finished")]
    Finished,
}

/// Parser options
#[derive(Debug, Clone, PartialEq)]
pub struct ParserOptions {
    /// Fence language tags treated as JSON (case-insensitive)
    pub json_tags: Vec<String>,
    /// Fence language tags treated as JSX (case-insensitive)
    pub jsx_tags: Vec<String>,
    pub max_buffer_bytes: usize,
    /// At `finish()`, parse an unterminated fence as if it had been closed
    pub close_unterminated_on_finish: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            json_tags: vec!["json".to_string()],
            jsx_tags: vec!["jsx".to_string()],
            max_buffer_bytes: DEFAULT_MAX_BUFFER_BYTES,
            close_unterminated_on_finish: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Streaming,
    Finished,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenFence {
    kind: FenceKind,
    /// Start of the opener line
    fence_start: usize,
    /// First byte after the opener line
    content_start: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Opener(FenceKind),
    Closer,
    Other,
}

/// Streaming content parser, one per in-flight message
#[derive(Debug)]
pub struct StreamParser {
    options: ParserOptions,
    buffer: String,
    /// Start of the first line not yet classified
    cursor: usize,
    /// Start of the current prose run
    text_start: usize,
    open_fence: Option<OpenFence>,
    blocks: Vec<ContentBlock>,
    phase: Phase,
    decoder: Utf8ChunkDecoder,
}

impl Default for StreamParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamParser {
    pub fn new() -> Self {
        Self::with_options(ParserOptions::default())
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Self {
            options,
            buffer: String::new(),
            cursor: 0,
            text_start: 0,
            open_fence: None,
            blocks: Vec::new(),
            phase: Phase::Streaming,
            decoder: Utf8ChunkDecoder::new(),
        }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Append a chunk and return the blocks it finalized
    pub fn push(&mut self, chunk: &str) -> Result<&[ContentBlock], ParserError> {
        match self.phase {
            Phase::Finished => return Err(ParserError::Finished),
            Phase::Aborted => return Ok(&[]),
            Phase::Streaming => {}
        }

        let attempted = self.buffer.len() + chunk.len();
        if attempted > self.options.max_buffer_bytes {
            return Err(ParserError::BufferLimitExceeded {
                limit: self.options.max_buffer_bytes,
                attempted,
            });
        }

        let before = self.blocks.len();
        self.buffer.push_str(chunk);
        self.scan_complete_lines();
        Ok(self.blocks_since(before))
    }

    /// Append raw bytes; a character split across calls is held back
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<&[ContentBlock], ParserError> {
        if self.phase == Phase::Finished {
            return Err(ParserError::Finished);
        }
        let text = self.decoder.decode(bytes);
        self.push(&text)
    }

    /// Feed the full text received so far. It must extend what was already
    /// seen; only the new suffix is processed.
    pub fn sync(&mut self, full: &str) -> Result<&[ContentBlock], ParserError> {
        if self.phase == Phase::Finished {
            return Err(ParserError::Finished);
        }
        if !full.starts_with(self.buffer.as_str()) {
            return Err(ParserError::NonMonotonicInput {
                received: self.buffer.len(),
            });
        }
        let suffix = full.get(self.buffer.len()..).unwrap_or_default();
        self.push(suffix)
    }

    /// Provisional view of the unfinished tail
    pub fn pending(&self) -> Option<PendingBlock> {
        if self.phase != Phase::Streaming {
            return None;
        }

        // A partial line starting with a backtick may become a fence marker
        let partial_line = self.buffer.get(self.cursor..).unwrap_or_default();
        let visible_end = if partial_line.trim_start().starts_with('`') {
            self.cursor
        } else {
            self.buffer.len()
        };

        match self.open_fence {
            Some(fence) => {
                let partial = self
                    .buffer
                    .get(fence.content_start..visible_end)
                    .unwrap_or_default()
                    .to_string();
                let preview = match fence.kind {
                    FenceKind::Json if partial.len() <= MAX_PREVIEW_BYTES => {
                        parse_tolerant_json(&partial)
                    }
                    FenceKind::Json => None,
                    FenceKind::Jsx => None,
                };
                Some(PendingBlock::Fence {
                    kind: fence.kind,
                    partial,
                    preview,
                })
            }
            None => {
                let raw = self
                    .buffer
                    .get(self.text_start..visible_end)
                    .unwrap_or_default();
                prose(raw).map(|text| PendingBlock::Text {
                    text: text.to_string(),
                })
            }
        }
    }

    /// End of stream: flush trailing prose and settle any open fence
    pub fn finish(&mut self) -> Result<&[ContentBlock], ParserError> {
        match self.phase {
            Phase::Finished => return Err(ParserError::Finished),
            Phase::Aborted => return Ok(&[]),
            Phase::Streaming => {}
        }

        let before = self.blocks.len();
        let tail = self.decoder.flush();
        self.buffer.push_str(&tail);

        // The last line is complete now even without a newline
        if self.cursor < self.buffer.len() {
            let end = self.buffer.len();
            self.process_line(self.cursor, end, end);
        }

        let end = self.buffer.len();
        match self.open_fence.take() {
            Some(fence) => self.settle_unterminated(fence),
            None => self.finalize_text(end),
        }
        self.text_start = end;
        self.phase = Phase::Finished;
        Ok(self.blocks_since(before))
    }

    /// Stop emitting. Complete prose lines outside a fence are finalized;
    /// an open fence and a trailing partial line are dropped. Returns the
    /// blocks finalized by the abort.
    pub fn abort(&mut self) -> &[ContentBlock] {
        let before = self.blocks.len();
        if self.phase == Phase::Streaming {
            if self.open_fence.is_none() {
                self.finalize_text(self.cursor);
            }
            tracing::debug!(
                blocks = self.blocks.len(),
                in_fence = self.open_fence.is_some(),
                "stream parser aborted"
            );
        }
        self.open_fence = None;
        self.phase = Phase::Aborted;
        self.blocks_since(before)
    }

    /// All finalized blocks
    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    /// Finalized blocks from index `n` on
    pub fn blocks_since(&self, n: usize) -> &[ContentBlock] {
        self.blocks.get(n..).unwrap_or_default()
    }

    pub fn into_blocks(self) -> Vec<ContentBlock> {
        self.blocks
    }

    /// Text received so far
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Kind of the currently open fence
    pub fn open_fence(&self) -> Option<FenceKind> {
        self.open_fence.map(|fence| fence.kind)
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn is_aborted(&self) -> bool {
        self.phase == Phase::Aborted
    }

    // ------------------------------------------------------------------
    // Line machine
    // ------------------------------------------------------------------

    fn scan_complete_lines(&mut self) {
        while let Some(offset) = self
            .buffer
            .get(self.cursor..)
            .and_then(|rest| rest.find('\n'))
        {
            let line_end = self.cursor + offset;
            self.process_line(self.cursor, line_end, line_end + 1);
        }
    }

    /// Classify the line `start..end`; `next` is where the following line starts
    fn process_line(&mut self, start: usize, end: usize, next: usize) {
        let line = self.buffer.get(start..end).unwrap_or_default();
        let kind = self.classify(line);

        match (self.open_fence, kind) {
            (None, LineKind::Opener(kind)) => {
                self.finalize_text(start);
                tracing::debug!(?kind, offset = start, "fence opened");
                self.open_fence = Some(OpenFence {
                    kind,
                    fence_start: start,
                    content_start: next,
                });
            }
            (Some(fence), LineKind::Closer) => {
                tracing::debug!(kind = ?fence.kind, offset = start, "fence closed");
                let content = self
                    .buffer
                    .get(fence.content_start..start)
                    .unwrap_or_default()
                    .to_string();
                let blocks = fence_blocks(fence.kind, &content);
                self.blocks.extend(blocks);
                self.open_fence = None;
                self.text_start = next;
            }
            _ => {}
        }

        self.cursor = next;
    }

    fn classify(&self, line: &str) -> LineKind {
        let trimmed = line.trim();
        if self.open_fence.is_some() {
            return if trimmed == FENCE {
                LineKind::Closer
            } else {
                LineKind::Other
            };
        }

        let Some(tag) = trimmed.strip_prefix(FENCE) else {
            return LineKind::Other;
        };
        let tag = tag.trim();
        let matches = |tags: &[String]| tags.iter().any(|t| t.eq_ignore_ascii_case(tag));
        if matches(&self.options.json_tags) {
            LineKind::Opener(FenceKind::Json)
        } else if matches(&self.options.jsx_tags) {
            LineKind::Opener(FenceKind::Jsx)
        } else {
            LineKind::Other
        }
    }

    fn finalize_text(&mut self, end: usize) {
        let raw = self.buffer.get(self.text_start..end).unwrap_or_default();
        if let Some(text) = prose(raw) {
            let block = ContentBlock::text(text);
            self.blocks.push(block);
        }
        self.text_start = end;
    }

    fn settle_unterminated(&mut self, fence: OpenFence) {
        let content = self
            .buffer
            .get(fence.content_start.min(self.buffer.len())..)
            .unwrap_or_default()
            .to_string();

        if content.trim().is_empty() {
            tracing::debug!(kind = ?fence.kind, "dropping empty unterminated fence");
            return;
        }

        if self.options.close_unterminated_on_finish {
            tracing::debug!(kind = ?fence.kind, "closing unterminated fence at end of stream");
            let blocks = fence_blocks(fence.kind, &content);
            self.blocks.extend(blocks);
        } else {
            let raw = self
                .buffer
                .get(fence.fence_start..)
                .unwrap_or_default()
                .to_string();
            tracing::warn!(kind = ?fence.kind, "stream ended inside an unterminated fence");
            self.blocks.push(ContentBlock::Error {
                kind: fence.kind.parse_error_kind(),
                raw,
                reason: "stream ended inside an unterminated fence".to_string(),
            });
        }
    }
}

/// Prose with surrounding blank lines removed; `None` when only whitespace
fn prose(raw: &str) -> Option<&str> {
    let text = raw
        .trim_end()
        .trim_start_matches(&['\n', '\r'][..]);
    (!text.trim().is_empty()).then_some(text)
}

/// Interpret the content of a closed fence
fn fence_blocks(kind: FenceKind, content: &str) -> Vec<ContentBlock> {
    let raw = content.trim_end_matches(&['\n', '\r'][..]);
    match kind {
        FenceKind::Json => json_blocks(raw),
        FenceKind::Jsx => match parse_jsx(raw) {
            Ok(nodes) => vec![ContentBlock::Jsx {
                source: raw.to_string(),
                nodes,
            }],
            Err(err) => {
                tracing::warn!(error = %err, "jsx fence failed to parse");
                vec![ContentBlock::Error {
                    kind: ParseErrorKind::JsxParse,
                    raw: raw.to_string(),
                    reason: err.to_string(),
                }]
            }
        },
    }
}

fn json_blocks(raw: &str) -> Vec<ContentBlock> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) if is_envelope(&value) => vec![ContentBlock::A2ui {
            message: value,
            raw: raw.to_string(),
        }],
        Ok(Value::Array(items)) if !items.is_empty() && items.iter().all(is_envelope) => items
            .into_iter()
            .map(|message| ContentBlock::A2ui {
                raw: message.to_string(),
                message,
            })
            .collect(),
        Ok(_) => vec![ContentBlock::Text {
            text: format!("{}json\n{}\n{}", FENCE, raw, FENCE),
        }],
        Err(err) => {
            tracing::warn!(error = %err, "json fence failed to parse");
            vec![ContentBlock::Error {
                kind: ParseErrorKind::JsonParse,
                raw: raw.to_string(),
                reason: err.to_string(),
            }]
        }
    }
}
