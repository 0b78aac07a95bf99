//! 混合渲染器测试
//!
//! 测试覆盖：
//! - A2UI 块：已知、未知、验证失败
//! - JSX 块：允许列表、插槽、自定义绑定、目录组件
//! - 错误隔离（包括 panic）
//! - Surface 折叠与渲染

use super::*;
use crate::streaming::{ContentBlock, FenceKind, PendingBlock, StreamParser};
use genui_a2ui::catalog::Catalog;
use genui_a2ui::error::RenderError;
use genui_a2ui::node::{Fallback, ParseErrorKind, RenderedNode, StreamingKind};
use genui_a2ui::surface::SurfaceState;
use serde_json::{json, Value};
use std::sync::Arc;

fn blocks_from(text: &str) -> Vec<ContentBlock> {
    let mut parser = StreamParser::new();
    parser.push(text).unwrap();
    parser.finish().unwrap();
    parser.into_blocks()
}

fn a2ui_block(message: Value) -> ContentBlock {
    ContentBlock::A2ui {
        raw: message.to_string(),
        message,
    }
}

fn envelope(components: Value) -> Value {
    json!({ "surfaceUpdate": { "components": components } })
}

/// Standard catalog whose Timeline renders its headline as text
fn timeline_catalog() -> Arc<Catalog> {
    let mut catalog = Catalog::standard();
    let timeline = catalog
        .get("Timeline")
        .cloned()
        .unwrap()
        .with_render(|props| {
            let headline = props.data["title"]["text"]["headline"]
                .as_str()
                .unwrap_or_default();
            Ok(RenderedNode::element(
                "Timeline",
                vec![RenderedNode::Text {
                    text: headline.to_string(),
                }],
            ))
        });
    catalog.register(timeline).unwrap();
    Arc::new(catalog)
}

// ============================================================================
// A2UI 块
// ============================================================================

#[cfg(test)]
mod a2ui_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_timeline_headline_renders_through_binding() {
        let bindings = Bindings::new(timeline_catalog());
        let text = r#"Here is the history:
```json
{"surfaceUpdate":{"components":[{"id":"t1","component":{"Timeline":{"data":{"title":{"text":{"headline":"Rust 1.0"}},"events":[{"start_date":{"year":2015}}]}}}}]}}
```"#;
        let nodes = render(&blocks_from(text), &bindings);

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0], RenderedNode::markdown("Here is the history:"));
        assert_eq!(nodes[1].children().len(), 1);
        assert_eq!(nodes[1].text_content(), "Rust 1.0");
        assert!(!nodes[1].children()[0].is_fallback());
    }

    #[test]
    fn test_schema_error_renders_validation_fallback() {
        let message = envelope(json!([
            { "id": "t1", "component": { "Timeline": { "data": { "events": [{ "start_date": { "year": "1915" } }] } } } }
        ]));
        let nodes = render(&[a2ui_block(message.clone())], &Bindings::default());

        match nodes[0].children()[0].as_fallback() {
            Some(Fallback::ValidationError {
                id,
                type_name,
                errors,
                raw,
            }) => {
                assert_eq!(id.as_deref(), Some("t1"));
                assert_eq!(type_name.as_deref(), Some("Timeline"));
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].display_path(), "events.[0].start_date.year");
                assert_eq!(raw, &message["surfaceUpdate"]["components"][0]);
            }
            other => panic!("expected validation fallback, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type_renders_fallback_with_raw_entry() {
        let entry = json!({ "id": "c1", "component": { "BarChart": { "data": { "series": [1, 2, 3] } } } });
        let nodes = render(&[a2ui_block(envelope(json!([entry.clone()])))], &Bindings::default());

        assert_eq!(
            nodes[0].children(),
            &[RenderedNode::Fallback(Fallback::UnknownType {
                id: "c1".into(),
                type_name: "BarChart".into(),
                raw: entry,
            })]
        );
    }

    #[test]
    fn test_entries_keep_message_order_across_outcomes() {
        let message = envelope(json!([
            { "id": "a", "component": { "Callout": { "data": { "body": "one" } } } },
            { "id": "b", "component": { "Callout": { "data": {} } } },
            { "id": "c", "component": { "Mystery": { "data": {} } } }
        ]));
        let nodes = render(&[a2ui_block(message)], &Bindings::default());
        let children = nodes[0].children();

        assert_eq!(children.len(), 3);
        assert!(matches!(&children[0], RenderedNode::Component { id, options, .. } if id == "a" && options == &json!({ "tone": "info" })));
        assert!(matches!(children[1].as_fallback(), Some(Fallback::ValidationError { .. })));
        assert!(matches!(children[2].as_fallback(), Some(Fallback::UnknownType { .. })));
    }

    #[test]
    fn test_bad_envelope_renders_single_validation_fallback() {
        let nodes = render(&[a2ui_block(json!({ "surfaceUpdate": {} }))], &Bindings::default());
        let children = nodes[0].children();
        assert_eq!(children.len(), 1);
        assert!(matches!(
            children[0].as_fallback(),
            Some(Fallback::ValidationError { id: None, .. })
        ));
    }

    #[test]
    fn test_parse_error_block_renders_parse_fallback() {
        let nodes = render(&blocks_from("```json\n{oops\n```"), &Bindings::default());
        assert!(matches!(
            nodes[0].as_fallback(),
            Some(Fallback::ParseError { kind: ParseErrorKind::JsonParse, raw, .. }) if raw == "{oops"
        ));
    }
}

// ============================================================================
// JSX 块
// ============================================================================

#[cfg(test)]
mod jsx_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_allowed_elements_and_unknown_names() {
        let bindings = Bindings::default().allow_all(["Card", "Badge"]);
        let nodes = render(
            &blocks_from("```jsx\n<Card title=\"Hi\" icon={Badge}>\n  Hello <Script />\n</Card>\n```"),
            &bindings,
        );

        match &nodes[0] {
            RenderedNode::Element {
                name,
                props,
                slots,
                children,
            } => {
                assert_eq!(name, "Card");
                assert_eq!(props.get("title"), Some(&json!("Hi")));
                assert_eq!(slots.get("icon"), Some(&RenderedNode::element("Badge", vec![])));
                assert_eq!(children[0], RenderedNode::Text { text: "Hello".into() });
                assert_eq!(
                    children[1],
                    RenderedNode::Fallback(Fallback::UnknownComponent {
                        name: "Script".into()
                    })
                );
            }
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    fn test_unbound_identifier_slot_is_a_fallback() {
        let bindings = Bindings::default().allow("Card");
        let nodes = render(&blocks_from("```jsx\n<Card icon={window} />\n```"), &bindings);
        match &nodes[0] {
            RenderedNode::Element { slots, .. } => assert_eq!(
                slots.get("icon"),
                Some(&RenderedNode::Fallback(Fallback::UnknownComponent {
                    name: "window".into()
                }))
            ),
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_binding_receives_props_and_children() {
        let bindings = Bindings::default().bind("Greeting", |props: &ElementProps<'_>| {
            let who = props.props.get("name").and_then(Value::as_str).unwrap_or("nobody");
            Ok(RenderedNode::markdown(format!(
                "Hello {} ({} children)",
                who,
                props.children.len()
            )))
        });
        let nodes = render(
            &blocks_from("```jsx\n<Greeting name=\"Ada\">{\"!\"}</Greeting>\n```"),
            &bindings,
        );
        assert_eq!(nodes[0], RenderedNode::markdown("Hello Ada (1 children)"));
    }

    #[test]
    fn test_catalog_component_from_jsx_is_validated() {
        let nodes = render(
            &blocks_from("```jsx\n<>\n<Callout id=\"c1\" body=\"Careful\" options={{\"tone\": \"warning\"}} />\n<Callout title=\"No body\" />\n</>\n```"),
            &Bindings::default(),
        );
        let children = nodes[0].children();

        assert_eq!(
            children[0],
            RenderedNode::Component {
                id: "c1".into(),
                type_name: "Callout".into(),
                data: json!({ "body": "Careful" }),
                options: json!({ "tone": "warning" }),
            }
        );
        assert!(matches!(
            children[1].as_fallback(),
            Some(Fallback::ValidationError { id: Some(id), .. }) if id == "jsx-callout"
        ));
    }

    #[test]
    fn test_catalog_hidden_from_jsx_is_unknown() {
        let bindings = Bindings::default().without_catalog_in_jsx();
        let nodes = render(&blocks_from("```jsx\n<Callout body=\"x\" />\n```"), &bindings);
        assert!(matches!(
            nodes[0].as_fallback(),
            Some(Fallback::UnknownComponent { name }) if name == "Callout"
        ));
    }
}

// ============================================================================
// 错误隔离
// ============================================================================

#[cfg(test)]
mod isolation_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_binding_error_is_inline() {
        let bindings = Bindings::default().bind("Broken", |_props: &ElementProps<'_>| {
            Err(RenderError::component("Broken", "missing data"))
        });
        let nodes = render(&blocks_from("```jsx\n<Broken />\n```"), &bindings);
        assert!(matches!(
            nodes[0].as_fallback(),
            Some(Fallback::RenderError { scope, message }) if scope == "Broken" && message.contains("missing data")
        ));
    }

    #[test]
    fn test_panicking_binding_only_breaks_its_block() {
        let bindings = Bindings::default().bind("Bomb", |_props: &ElementProps<'_>| -> Result<RenderedNode, RenderError> {
            panic!("boom")
        });
        let text = "Before\n```jsx\n<Bomb />\n```\nAfter";
        let nodes = render(&blocks_from(text), &bindings);

        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0], RenderedNode::markdown("Before"));
        match nodes[1].as_fallback() {
            Some(Fallback::RenderError { message, .. }) => assert!(message.contains("boom")),
            other => panic!("expected render error, got {:?}", other),
        }
        assert_eq!(nodes[2], RenderedNode::markdown("After"));
    }

    #[test]
    fn test_panicking_catalog_render_only_breaks_its_entry() {
        let mut catalog = Catalog::standard();
        let callout = catalog
            .get("Callout")
            .cloned()
            .unwrap()
            .with_render(|props| {
                if props.id == "bad" {
                    panic!("cannot draw {}", props.id);
                }
                Ok(RenderedNode::markdown(props.id.to_string()))
            });
        catalog.register(callout).unwrap();

        let message = envelope(json!([
            { "id": "bad", "component": { "Callout": { "data": { "body": "x" } } } },
            { "id": "good", "component": { "Callout": { "data": { "body": "y" } } } }
        ]));
        let nodes = render(&[a2ui_block(message)], &Bindings::new(Arc::new(catalog)));
        let children = nodes[0].children();

        assert!(matches!(
            children[0].as_fallback(),
            Some(Fallback::RenderError { scope, message }) if scope == "bad" && message.contains("cannot draw bad")
        ));
        assert_eq!(children[1], RenderedNode::markdown("good"));
    }
}

// ============================================================================
// 待定块与 Surface
// ============================================================================

#[cfg(test)]
mod surface_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_pending_marks_streaming() {
        let renderer = HybridRenderer::default();
        let node = renderer.render_pending(&PendingBlock::Fence {
            kind: FenceKind::Json,
            partial: "{\"surf".into(),
            preview: Some(json!({})),
        });
        assert_eq!(
            node,
            RenderedNode::Streaming {
                kind: StreamingKind::Json,
                partial: "{\"surf".into(),
                preview: Some(json!({})),
            }
        );
    }

    #[test]
    fn test_duplicate_ids_across_blocks_upsert_in_place() {
        let first = envelope(json!([
            { "id": "dup", "component": { "Callout": { "data": { "body": "first" } } } },
            { "id": "other", "component": { "Callout": { "data": { "body": "other" } } } }
        ]));
        let second = envelope(json!([
            { "id": "dup", "component": { "StatCard": { "data": { "label": "Users", "value": 3 } } } }
        ]));
        let renderer = HybridRenderer::default();
        let (nodes, surface) = renderer.render_into_surface(
            &[a2ui_block(first), ContentBlock::text("between"), a2ui_block(second)],
            &SurfaceState::new(),
        );

        assert_eq!(nodes.len(), 3);
        assert_eq!(surface.ids().collect::<Vec<_>>(), vec!["dup", "other"]);
        let dup = surface.get("dup").unwrap();
        assert_eq!(dup.type_name, "StatCard");
        assert_eq!(dup.data, json!({ "label": "Users", "value": 3 }));

        let rendered = renderer.render_surface(&surface);
        assert!(matches!(&rendered[0], RenderedNode::Component { type_name, .. } if type_name == "StatCard"));
        assert!(matches!(&rendered[1], RenderedNode::Component { id, .. } if id == "other"));
    }

    #[test]
    fn test_render_into_surface_leaves_input_untouched() {
        let surface = SurfaceState::new();
        let message = envelope(json!([
            { "id": "x", "component": { "Callout": { "data": { "body": "b" } } } }
        ]));
        let (_, next) = HybridRenderer::default().render_into_surface(&[a2ui_block(message)], &surface);
        assert!(surface.is_empty());
        assert_eq!(next.len(), 1);
    }

    #[test]
    fn test_render_surface_unknown_entry_rebuilds_raw() {
        let message = envelope(json!([
            { "id": "chart", "component": { "BarChart": { "data": { "bars": 2 } } } }
        ]));
        let renderer = HybridRenderer::default();
        let (_, surface) = renderer.render_into_surface(&[a2ui_block(message)], &SurfaceState::new());
        let nodes = renderer.render_surface(&surface);

        assert_eq!(
            nodes,
            vec![RenderedNode::Fallback(Fallback::UnknownType {
                id: "chart".into(),
                type_name: "BarChart".into(),
                raw: json!({
                    "id": "chart",
                    "component": { "BarChart": { "data": { "bars": 2 }, "options": {} } }
                }),
            })]
        );
    }
}
