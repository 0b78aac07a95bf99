//! 渲染输出模型
//!
//! 目录中的渲染绑定与混合渲染器共用的节点树。宿主 UI 负责把节点映射为
//! 实际控件；回退状态是一等输出，而不是被吞掉的错误。

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::common::FieldError;

/// 解析错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseErrorKind {
    /// 已闭合的 ```json 围栏无法解析
    JsonParse,
    /// 已闭合的 ```jsx 围栏无法解析
    JsxParse,
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrorKind::JsonParse => f.write_str("json-parse"),
            ParseErrorKind::JsxParse => f.write_str("jsx-parse"),
        }
    }
}

/// 仍在生成中的内容类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamingKind {
    Text,
    Json,
    Jsx,
}

/// 回退节点
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "fallback", rename_all = "camelCase")]
pub enum Fallback {
    /// 目录中没有该类型
    #[serde(rename_all = "camelCase")]
    UnknownType {
        id: String,
        type_name: String,
        raw: Value,
    },
    /// 负载未通过验证
    #[serde(rename_all = "camelCase")]
    ValidationError {
        id: Option<String>,
        type_name: Option<String>,
        errors: Vec<FieldError>,
        raw: Value,
    },
    /// 围栏内容无法解析
    ParseError {
        kind: ParseErrorKind,
        raw: String,
        reason: String,
    },
    /// JSX 引用了未绑定的组件名
    UnknownComponent { name: String },
    /// 渲染函数失败或 panic
    RenderError { scope: String, message: String },
}

/// 渲染节点
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "camelCase")]
pub enum RenderedNode {
    /// 散文（Markdown）
    Markdown { text: String },
    /// JSX 中的文本子节点
    Text { text: String },
    /// JSX 元素或自定义绑定产出的元素
    Element {
        name: String,
        props: Map<String, Value>,
        #[serde(skip_serializing_if = "BTreeMap::is_empty")]
        slots: BTreeMap<String, RenderedNode>,
        children: Vec<RenderedNode>,
    },
    /// A2UI 组件
    #[serde(rename_all = "camelCase")]
    Component {
        id: String,
        type_name: String,
        data: Value,
        options: Value,
    },
    /// 无包装的节点序列
    Fragment { children: Vec<RenderedNode> },
    /// 仍在生成中的临时内容
    Streaming {
        kind: StreamingKind,
        partial: String,
        preview: Option<Value>,
    },
    /// 回退
    Fallback(Fallback),
}

impl RenderedNode {
    /// 创建 Markdown 节点
    pub fn markdown(text: impl Into<String>) -> Self {
        RenderedNode::Markdown { text: text.into() }
    }

    /// 创建不带属性的元素
    pub fn element(name: impl Into<String>, children: Vec<RenderedNode>) -> Self {
        RenderedNode::Element {
            name: name.into(),
            props: Map::new(),
            slots: BTreeMap::new(),
            children,
        }
    }

    /// 创建渲染错误回退
    pub fn render_error(scope: impl Into<String>, message: impl Into<String>) -> Self {
        RenderedNode::Fallback(Fallback::RenderError {
            scope: scope.into(),
            message: message.into(),
        })
    }

    /// 是否为回退节点
    pub fn is_fallback(&self) -> bool {
        matches!(self, RenderedNode::Fallback(_))
    }

    /// 获取回退内容
    pub fn as_fallback(&self) -> Option<&Fallback> {
        match self {
            RenderedNode::Fallback(fallback) => Some(fallback),
            _ => None,
        }
    }

    /// 子节点
    pub fn children(&self) -> &[RenderedNode] {
        match self {
            RenderedNode::Element { children, .. } | RenderedNode::Fragment { children } => {
                children
            }
            _ => &[],
        }
    }

    /// 深度优先收集所有文本内容，便于测试与无障碍摘要
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            RenderedNode::Markdown { text } | RenderedNode::Text { text } => out.push_str(text),
            RenderedNode::Element {
                slots, children, ..
            } => {
                for slot in slots.values() {
                    slot.collect_text(out);
                }
                for child in children {
                    child.collect_text(out);
                }
            }
            RenderedNode::Fragment { children } => {
                for child in children {
                    child.collect_text(out);
                }
            }
            RenderedNode::Streaming { partial, .. } => out.push_str(partial),
            RenderedNode::Component { .. } | RenderedNode::Fallback(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_content_walks_tree() {
        let node = RenderedNode::Fragment {
            children: vec![
                RenderedNode::markdown("a"),
                RenderedNode::element("Card", vec![RenderedNode::Text { text: "b".into() }]),
            ],
        };
        assert_eq!(node.text_content(), "ab");
    }

    #[test]
    fn test_fallback_serialization_is_tagged() {
        let node = RenderedNode::Fallback(Fallback::UnknownType {
            id: "c1".into(),
            type_name: "BarChart".into(),
            raw: json!({}),
        });
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({
                "node": "fallback",
                "fallback": "unknownType",
                "id": "c1",
                "typeName": "BarChart",
                "raw": {}
            })
        );
    }

    #[test]
    fn test_parse_error_kind_display() {
        assert_eq!(ParseErrorKind::JsonParse.to_string(), "json-parse");
        assert_eq!(
            serde_json::to_value(ParseErrorKind::JsxParse).unwrap(),
            json!("jsx-parse")
        );
    }
}
