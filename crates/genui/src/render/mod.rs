//! Render Module
//!
//! Turns content blocks into a host-agnostic node tree:
//! - `Bindings`: allow-list of names JSX may use, plus the component catalog
//! - `HybridRenderer`: per-block dispatch with error isolation
//! - Surface folding for persistent A2UI state

pub mod bindings;
pub mod renderer;

#[cfg(test)]
mod tests;

pub use bindings::{Bindings, ElementProps, ElementRenderFn, ResolvedBinding};
pub use renderer::{render, HybridRenderer};
