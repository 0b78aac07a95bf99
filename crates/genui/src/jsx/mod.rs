//! Restricted JSX
//!
//! Parses the component trees a model writes in ```jsx fences. Only elements,
//! fragments, text, JSON-like literals and bare identifiers are accepted;
//! the renderer resolves identifiers against an explicit allow-list.

mod ast;
mod parser;

pub use ast::{JsxAttr, JsxElement, JsxNode, JsxValue};
pub use parser::{parse_jsx, JsxError, MAX_DEPTH};
