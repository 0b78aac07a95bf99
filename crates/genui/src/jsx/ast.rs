//! Restricted JSX syntax tree
//!
//! JSX is treated as data: attribute values and expression children are
//! either JSON-like literals or bare identifiers naming a bound component.
//! There is nothing to evaluate.

use serde::Serialize;
use serde_json::Value;

/// Attribute value or expression child
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum JsxValue {
    Literal(Value),
    Ident(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsxAttr {
    pub name: String,
    pub value: JsxValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsxElement {
    pub name: String,
    pub attrs: Vec<JsxAttr>,
    pub children: Vec<JsxNode>,
}

impl JsxElement {
    pub fn attr(&self, name: &str) -> Option<&JsxValue> {
        self.attrs
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| &attr.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum JsxNode {
    Element(JsxElement),
    Fragment { children: Vec<JsxNode> },
    Text { text: String },
    Expr { value: JsxValue },
}
