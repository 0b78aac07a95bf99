//! A2UI 错误类型
//!
//! 验证失败不是错误（以数据形式返回），这里只有目录注册期的错误。

use thiserror::Error;

/// 目录注册错误
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CatalogError {
    /// JSON Schema 无法编译
    #[error("invalid JSON schema: {0}")]
    InvalidSchema(String),

    /// 无法从类型推导 schema
    #[error("schema generation failed: {0}")]
    SchemaGeneration(String),

    /// 类型名为空或包含空白
    #[error("invalid component type name: {0:?}")]
    InvalidTypeName(String),
}

/// 渲染绑定错误
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    /// 组件渲染函数报告失败
    #[error("component {component} failed to render: {message}")]
    Component { component: String, message: String },

    /// 引用了未绑定的名字
    #[error("unknown identifier `{0}`")]
    UnknownIdentifier(String),

    /// 渲染过程中 panic
    #[error("render panicked: {0}")]
    Panicked(String),
}

impl RenderError {
    /// 创建组件渲染错误
    pub fn component(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }
}
