//! Content blocks produced by the streaming parser

use genui_a2ui::node::{ParseErrorKind, StreamingKind};
use serde::Serialize;
use serde_json::Value;

use crate::jsx::JsxNode;

/// Language of a recognized fence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FenceKind {
    Json,
    Jsx,
}

impl FenceKind {
    /// Error kind reported when the fence content cannot be parsed
    pub fn parse_error_kind(self) -> ParseErrorKind {
        match self {
            FenceKind::Json => ParseErrorKind::JsonParse,
            FenceKind::Jsx => ParseErrorKind::JsxParse,
        }
    }

    pub fn streaming_kind(self) -> StreamingKind {
        match self {
            FenceKind::Json => StreamingKind::Json,
            FenceKind::Jsx => StreamingKind::Jsx,
        }
    }
}

/// A finalized block. Never changes and is never emitted twice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Prose between fences
    Text { text: String },
    /// A closed ```jsx fence that parsed under the restricted grammar
    Jsx { source: String, nodes: Vec<JsxNode> },
    /// A closed ```json fence holding an A2UI envelope
    A2ui { message: Value, raw: String },
    /// A closed fence whose content could not be parsed
    Error {
        kind: ParseErrorKind,
        raw: String,
        reason: String,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ContentBlock::Error { .. })
    }

    /// Short label used in logs and render error scopes
    pub fn kind_name(&self) -> &'static str {
        match self {
            ContentBlock::Text { .. } => "text",
            ContentBlock::Jsx { .. } => "jsx",
            ContentBlock::A2ui { .. } => "a2ui",
            ContentBlock::Error { .. } => "error",
        }
    }
}

/// Provisional view of the unfinished tail of the buffer. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PendingBlock {
    /// Prose that has not been closed off by a fence yet
    Text { text: String },
    /// An open fence and its content so far
    Fence {
        kind: FenceKind,
        partial: String,
        /// Best-effort reading of an open json fence
        preview: Option<Value>,
    },
}
