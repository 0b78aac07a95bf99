//! # genui
//!
//! 混合流式生成式 UI 运行时
//!
//! 把语言模型的增量输出（散文、```jsx 组件树、```json A2UI 消息）
//! 转换为经过验证、可安全渲染的节点树：
//! - `streaming`: 增量内容块解析器与异步驱动
//! - `jsx`: 受限 JSX 语法（纯数据，无求值）
//! - `render`: 混合渲染器与绑定允许列表
//! - `session`: “对话 + UI” 快照的存储契约
//! - `config` / `logging`: 配置加载与日志初始化
//!
//! ## 快速开始
//!
//! ```rust
//! use genui::render::{Bindings, HybridRenderer};
//! use genui::streaming::StreamParser;
//!
//! let mut parser = StreamParser::new();
//! parser.push("Here you go:\n```js").unwrap();
//! parser.push("on\n{\"surfaceUpdate\":{\"components\":[]}}\n```\n").unwrap();
//! parser.finish().unwrap();
//!
//! let renderer = HybridRenderer::new(Bindings::default());
//! let nodes = renderer.render(parser.blocks());
//! assert_eq!(nodes.len(), 2);
//! ```

pub mod config;
pub mod jsx;
pub mod logging;
pub mod render;
pub mod session;
pub mod streaming;

pub use genui_a2ui as a2ui;

pub use config::GenuiConfig;
pub use render::{render, Bindings, HybridRenderer};
pub use streaming::{drive, ContentBlock, PendingBlock, StreamEvent, StreamParser};
