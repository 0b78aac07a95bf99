//! # genui-a2ui
//!
//! A2UI (Agent-to-User Interface) 协议核心
//!
//! 提供：
//! - `surfaceUpdate` 消息类型定义
//! - 组件目录（类型名 → 验证器、提示词说明、渲染绑定）
//! - 基于 JSON Schema 的消息验证
//! - Surface 状态归约
//! - 标准组件目录
//!
//! ## 快速开始
//!
//! ```rust
//! use genui_a2ui::prelude::*;
//! use serde_json::json;
//!
//! let catalog = standard_catalog();
//! let raw = json!({
//!     "surfaceUpdate": { "components": [
//!         { "id": "t1", "component": { "Timeline": { "data": { "events": [] } } } }
//!     ] }
//! });
//!
//! let (surface, validation) = SurfaceState::new().apply_raw(&catalog, &raw);
//! assert!(validation.is_clean());
//! assert_eq!(surface.len(), 1);
//! ```

pub mod catalog;
pub mod common;
pub mod error;
pub mod node;
pub mod protocol;
pub mod schema;
pub mod standard;
pub mod surface;
pub mod validation;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::catalog::*;
    pub use crate::common::*;
    pub use crate::error::*;
    pub use crate::node::*;
    pub use crate::protocol::*;
    pub use crate::schema::*;
    pub use crate::surface::*;
    pub use crate::validation::*;
}
