//! Streaming Module
//!
//! Turns incrementally generated model output into content blocks:
//! - Line-based fence parser for prose, ```json and ```jsx
//! - Tolerant JSON preview of open fences
//! - UTF-8 decoding for byte chunks
//! - Async driver with cancellation

pub mod block;
pub mod driver;
pub mod parser;
pub mod tolerant_json;
pub mod utf8;


// Re-exports
pub use block::{ContentBlock, FenceKind, PendingBlock};
pub use driver::{drive, FinishReason, StreamEvent};
pub use parser::{
    ParserError, ParserOptions, StreamParser, DEFAULT_MAX_BUFFER_BYTES, MAX_PREVIEW_BYTES,
};
pub use tolerant_json::parse_tolerant_json;
pub use utf8::Utf8ChunkDecoder;
