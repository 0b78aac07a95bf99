//! Render bindings
//!
//! The allow-list of names a JSX block may use. A name is either a plain
//! element passed through to the host, a custom render function, or (when
//! enabled) a catalog component whose props are validated like an A2UI entry.

use genui_a2ui::catalog::{standard_catalog, Catalog, CatalogEntry};
use genui_a2ui::error::RenderError;
use genui_a2ui::node::RenderedNode;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Props passed to a custom element binding
#[derive(Debug, Clone, Copy)]
pub struct ElementProps<'a> {
    pub name: &'a str,
    pub props: &'a Map<String, Value>,
    /// Attributes whose value was a bound identifier, already rendered
    pub slots: &'a BTreeMap<String, RenderedNode>,
    pub children: &'a [RenderedNode],
}

/// Custom element render function
pub type ElementRenderFn =
    Arc<dyn Fn(&ElementProps<'_>) -> Result<RenderedNode, RenderError> + Send + Sync>;

#[derive(Clone)]
enum Binding {
    Element,
    Custom(ElementRenderFn),
}

/// What a name resolved to
pub enum ResolvedBinding<'a> {
    /// Pass through as a [`RenderedNode::Element`]
    Element,
    Custom(&'a ElementRenderFn),
    Catalog(&'a CatalogEntry),
}

/// Names available to JSX, plus the catalog used for A2UI blocks
#[derive(Clone)]
pub struct Bindings {
    catalog: Arc<Catalog>,
    elements: IndexMap<String, Binding>,
    catalog_in_jsx: bool,
}

impl fmt::Debug for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bindings")
            .field("catalog", &self.catalog)
            .field("elements", &self.elements.keys().collect::<Vec<_>>())
            .field("catalog_in_jsx", &self.catalog_in_jsx)
            .finish()
    }
}

impl Default for Bindings {
    fn default() -> Self {
        Self::new(standard_catalog())
    }
}

impl Bindings {
    /// Bindings over `catalog`. Catalog types are usable from JSX by default.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            elements: IndexMap::new(),
            catalog_in_jsx: true,
        }
    }

    /// Allow `name` as a plain element
    pub fn allow(mut self, name: impl Into<String>) -> Self {
        self.elements.insert(name.into(), Binding::Element);
        self
    }

    /// Allow several plain elements
    pub fn allow_all<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.elements.insert(name.into(), Binding::Element);
        }
        self
    }

    /// Bind `name` to a render function. Replaces any earlier binding.
    pub fn bind<F>(mut self, name: impl Into<String>, render: F) -> Self
    where
        F: Fn(&ElementProps<'_>) -> Result<RenderedNode, RenderError> + Send + Sync + 'static,
    {
        self.elements
            .insert(name.into(), Binding::Custom(Arc::new(render)));
        self
    }

    /// Do not expose catalog types to JSX
    pub fn without_catalog_in_jsx(mut self) -> Self {
        self.catalog_in_jsx = false;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn shared_catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    /// Resolve a JSX name. Explicit bindings win over catalog types.
    pub fn resolve(&self, name: &str) -> Option<ResolvedBinding<'_>> {
        match self.elements.get(name) {
            Some(Binding::Element) => Some(ResolvedBinding::Element),
            Some(Binding::Custom(render)) => Some(ResolvedBinding::Custom(render)),
            None if self.catalog_in_jsx => self.catalog.get(name).map(ResolvedBinding::Catalog),
            None => None,
        }
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_order() {
        let bindings = Bindings::default()
            .allow("div")
            .bind("Callout", |_props: &ElementProps<'_>| Ok(RenderedNode::markdown("custom")));

        assert!(matches!(bindings.resolve("div"), Some(ResolvedBinding::Element)));
        assert!(matches!(bindings.resolve("Callout"), Some(ResolvedBinding::Custom(_))));
        assert!(matches!(bindings.resolve("Timeline"), Some(ResolvedBinding::Catalog(_))));
        assert!(bindings.resolve("script").is_none());
    }

    #[test]
    fn test_catalog_can_be_hidden_from_jsx() {
        let bindings = Bindings::default().without_catalog_in_jsx();
        assert!(!bindings.is_bound("Timeline"));
        assert!(bindings.catalog().has("Timeline"));
    }
}
