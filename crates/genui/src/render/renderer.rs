//! Hybrid renderer
//!
//! Dispatches each content block to the right path: prose becomes markdown,
//! JSX is resolved against the bindings allow-list, A2UI messages are
//! validated against the catalog. Every block renders in isolation; a failing
//! or panicking binding yields an inline error node for that block only.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use genui_a2ui::catalog::{CatalogEntry, ComponentProps};
use genui_a2ui::error::RenderError;
use genui_a2ui::node::{Fallback, RenderedNode, StreamingKind};
use genui_a2ui::protocol::{COMPONENTS_KEY, SURFACE_UPDATE_KEY};
use genui_a2ui::surface::{SurfaceEntry, SurfaceState};
use genui_a2ui::validation::{validate_message, MessageValidation, ValidatedEntry};
use serde_json::{json, Map, Value};

use super::bindings::{Bindings, ElementProps, ResolvedBinding};
use crate::jsx::{JsxElement, JsxNode, JsxValue};
use crate::streaming::{ContentBlock, PendingBlock};

/// Render blocks with a one-off renderer over `bindings`
pub fn render(blocks: &[ContentBlock], bindings: &Bindings) -> Vec<RenderedNode> {
    HybridRenderer::new(bindings.clone()).render(blocks)
}

/// Renders content blocks into a node tree
#[derive(Debug, Clone, Default)]
pub struct HybridRenderer {
    bindings: Bindings,
}

impl HybridRenderer {
    pub fn new(bindings: Bindings) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Render every block, one node per block
    pub fn render(&self, blocks: &[ContentBlock]) -> Vec<RenderedNode> {
        blocks
            .iter()
            .enumerate()
            .map(|(index, block)| self.render_block(index, block))
            .collect()
    }

    /// Render one block. Panics inside bindings are caught here.
    pub fn render_block(&self, index: usize, block: &ContentBlock) -> RenderedNode {
        let scope = format!("{} block #{}", block.kind_name(), index);
        isolate(&scope, || self.render_block_inner(block))
    }

    fn render_block_inner(&self, block: &ContentBlock) -> RenderedNode {
        match block {
            ContentBlock::Text { text } => RenderedNode::markdown(text.clone()),
            ContentBlock::Jsx { nodes, .. } => {
                let mut rendered = self.render_jsx_nodes(nodes);
                if rendered.len() == 1 {
                    rendered.remove(0)
                } else {
                    RenderedNode::Fragment { children: rendered }
                }
            }
            ContentBlock::A2ui { message, .. } => {
                let validation = validate_message(self.bindings.catalog(), message);
                self.render_validation(message, &validation)
            }
            ContentBlock::Error { kind, raw, reason } => {
                RenderedNode::Fallback(Fallback::ParseError {
                    kind: *kind,
                    raw: raw.clone(),
                    reason: reason.clone(),
                })
            }
        }
    }

    /// "Still generating" node for the unfinished tail
    pub fn render_pending(&self, pending: &PendingBlock) -> RenderedNode {
        match pending {
            PendingBlock::Text { text } => RenderedNode::Streaming {
                kind: StreamingKind::Text,
                partial: text.clone(),
                preview: None,
            },
            PendingBlock::Fence {
                kind,
                partial,
                preview,
            } => RenderedNode::Streaming {
                kind: kind.streaming_kind(),
                partial: partial.clone(),
                preview: preview.clone(),
            },
        }
    }

    /// Render blocks and fold every A2UI block into `surface`
    ///
    /// Returns the rendered nodes and the new surface. `surface` itself is
    /// not modified.
    pub fn render_into_surface(
        &self,
        blocks: &[ContentBlock],
        surface: &SurfaceState,
    ) -> (Vec<RenderedNode>, SurfaceState) {
        let mut surface = surface.clone();
        let mut nodes = Vec::with_capacity(blocks.len());

        for (index, block) in blocks.iter().enumerate() {
            match block {
                ContentBlock::A2ui { message, .. } => {
                    let validation = validate_message(self.bindings.catalog(), message);
                    surface = surface.apply_message(&validation);
                    let scope = format!("a2ui block #{}", index);
                    nodes.push(isolate(&scope, || {
                        self.render_validation(message, &validation)
                    }));
                }
                other => nodes.push(self.render_block(index, other)),
            }
        }

        (nodes, surface)
    }

    /// Render the persistent surface in order, one node per entry
    pub fn render_surface(&self, surface: &SurfaceState) -> Vec<RenderedNode> {
        surface
            .ordered()
            .map(|entry| {
                isolate(&entry.id, || {
                    self.render_component(
                        &entry.id,
                        &entry.type_name,
                        &entry.data,
                        &entry.options,
                        entry.known,
                        || surface_entry_raw(entry),
                    )
                })
            })
            .collect()
    }

    /// Render a validated message, entries in `components` order
    fn render_validation(&self, message: &Value, validation: &MessageValidation) -> RenderedNode {
        let mut items: Vec<(Option<usize>, RenderedNode)> =
            Vec::with_capacity(validation.valid.len() + validation.invalid.len());

        for entry in &validation.valid {
            items.push((Some(entry.index), self.render_entry(message, entry)));
        }
        for invalid in &validation.invalid {
            let node = RenderedNode::Fallback(Fallback::ValidationError {
                id: invalid.id.clone(),
                type_name: invalid.type_name.clone(),
                errors: invalid.errors.clone(),
                raw: invalid.entry.clone(),
            });
            items.push((invalid.index, node));
        }
        items.sort_by_key(|(index, _)| *index);

        RenderedNode::Fragment {
            children: items.into_iter().map(|(_, node)| node).collect(),
        }
    }

    fn render_entry(&self, message: &Value, entry: &ValidatedEntry) -> RenderedNode {
        self.render_component(
            &entry.id,
            &entry.type_name,
            &entry.data,
            &entry.options,
            entry.known,
            || {
                message[SURFACE_UPDATE_KEY][COMPONENTS_KEY]
                    .get(entry.index)
                    .cloned()
                    .unwrap_or(Value::Null)
            },
        )
    }

    fn render_component<R>(
        &self,
        id: &str,
        type_name: &str,
        data: &Value,
        options: &Value,
        known: bool,
        raw: R,
    ) -> RenderedNode
    where
        R: FnOnce() -> Value,
    {
        let entry = match self.bindings.catalog().get(type_name) {
            Some(entry) if known => entry,
            _ => {
                tracing::debug!(id, type_name, "rendering unknown component type as fallback");
                return RenderedNode::Fallback(Fallback::UnknownType {
                    id: id.to_string(),
                    type_name: type_name.to_string(),
                    raw: raw(),
                });
            }
        };

        let props = ComponentProps {
            id,
            type_name,
            data,
            options,
        };
        match entry.render_fn() {
            Some(render) => isolate(id, || {
                render(&props).unwrap_or_else(|err| {
                    tracing::warn!(id, type_name, error = %err, "component render failed");
                    RenderedNode::render_error(id, err.to_string())
                })
            }),
            None => RenderedNode::Component {
                id: id.to_string(),
                type_name: type_name.to_string(),
                data: data.clone(),
                options: options.clone(),
            },
        }
    }

    fn render_jsx_nodes(&self, nodes: &[JsxNode]) -> Vec<RenderedNode> {
        nodes.iter().map(|node| self.render_jsx(node)).collect()
    }

    fn render_jsx(&self, node: &JsxNode) -> RenderedNode {
        match node {
            JsxNode::Text { text } => RenderedNode::Text { text: text.clone() },
            JsxNode::Fragment { children } => RenderedNode::Fragment {
                children: self.render_jsx_nodes(children),
            },
            JsxNode::Expr { value } => match value {
                JsxValue::Ident(name) => self.render_ident(name),
                JsxValue::Literal(Value::Null) => RenderedNode::Fragment {
                    children: Vec::new(),
                },
                JsxValue::Literal(Value::String(text)) => RenderedNode::Text { text: text.clone() },
                JsxValue::Literal(other) => RenderedNode::Text {
                    text: other.to_string(),
                },
            },
            JsxNode::Element(element) => self.render_element(element),
        }
    }

    /// A bare identifier renders as an empty element of that name
    fn render_ident(&self, name: &str) -> RenderedNode {
        let element = JsxElement {
            name: name.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        };
        self.render_element(&element)
    }

    fn render_element(&self, element: &JsxElement) -> RenderedNode {
        let name = element.name.as_str();
        let Some(binding) = self.bindings.resolve(name) else {
            tracing::debug!(name, "jsx references an unbound name");
            return RenderedNode::Fallback(Fallback::UnknownComponent {
                name: name.to_string(),
            });
        };

        let mut props = Map::new();
        let mut slots = BTreeMap::new();
        for attr in &element.attrs {
            match &attr.value {
                JsxValue::Literal(value) => {
                    props.insert(attr.name.clone(), value.clone());
                }
                JsxValue::Ident(ident) => {
                    slots.insert(attr.name.clone(), self.render_ident(ident));
                }
            }
        }
        let children = self.render_jsx_nodes(&element.children);

        match binding {
            ResolvedBinding::Element => RenderedNode::Element {
                name: name.to_string(),
                props,
                slots,
                children,
            },
            ResolvedBinding::Custom(render) => {
                let element_props = ElementProps {
                    name,
                    props: &props,
                    slots: &slots,
                    children: &children,
                };
                isolate(name, || {
                    render(&element_props).unwrap_or_else(|err| {
                        tracing::warn!(name, error = %err, "element render failed");
                        RenderedNode::render_error(name, err.to_string())
                    })
                })
            }
            ResolvedBinding::Catalog(entry) => self.render_catalog_element(entry, props),
        }
    }

    /// A catalog type used from JSX
    ///
    /// `data` and `options` attributes are used as given. Without a `data`
    /// attribute the remaining attributes form the data object. `id` names
    /// the component.
    fn render_catalog_element(&self, entry: &CatalogEntry, props: Map<String, Value>) -> RenderedNode {
        let type_name = entry.type_name();
        let raw = Value::Object(props.clone());
        let mut rest = props;

        let id = match rest.remove("id") {
            Some(Value::String(id)) => id,
            _ => format!("jsx-{}", type_name.to_lowercase()),
        };
        let options = rest.remove("options");
        let data = rest
            .remove("data")
            .unwrap_or_else(|| Value::Object(std::mem::take(&mut rest)));

        let mut errors = entry.validate_data(&data);
        let options = match entry.resolve_options(options.as_ref()) {
            Ok(options) => options,
            Err(option_errors) => {
                errors.extend(option_errors);
                Value::Null
            }
        };
        if !errors.is_empty() {
            tracing::warn!(id = %id, type_name, errors = errors.len(), "jsx component failed validation");
            return RenderedNode::Fallback(Fallback::ValidationError {
                id: Some(id),
                type_name: Some(type_name.to_string()),
                errors,
                raw,
            });
        }

        self.render_component(&id, type_name, &data, &options, true, || raw)
    }
}

/// Run `f`, turning a panic into a render error node for `scope`
fn isolate<F>(scope: &str, f: F) -> RenderedNode
where
    F: FnOnce() -> RenderedNode,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(node) => node,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(scope, message = %message, "render panicked");
            RenderedNode::render_error(scope, RenderError::Panicked(message).to_string())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Rebuild the wire entry for a stored surface component
fn surface_entry_raw(entry: &SurfaceEntry) -> Value {
    let mut payload = Map::new();
    payload.insert(entry.type_name.clone(), json!({ "data": entry.data, "options": entry.options }));
    json!({ "id": entry.id, "component": Value::Object(payload) })
}
