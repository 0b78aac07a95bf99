//! A2UI 协议消息类型
//!
//! 定义 Agent 输出的 `surfaceUpdate` 消息信封。
//!
//! 这里的类型用于构建和序列化消息；接收方向的消息一律以
//! `serde_json::Value` 形式交给 [`crate::validation::validate_message`]，
//! 因为 LLM 产出的内容在验证之前不能假定结构正确。

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::ComponentId;

/// 信封顶层键
pub const SURFACE_UPDATE_KEY: &str = "surfaceUpdate";

/// `surfaceUpdate` 下的组件数组键
pub const COMPONENTS_KEY: &str = "components";

// ============================================================================
// 消息信封
// ============================================================================

/// A2UI 消息信封
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct A2uiMessage {
    /// Surface 更新内容
    pub surface_update: SurfaceUpdate,
}

/// Surface 更新
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SurfaceUpdate {
    /// 组件列表（顺序即渲染顺序）
    pub components: Vec<ComponentEntry>,
}

/// 组件条目
///
/// `component` 下必须恰好有一个键，即组件类型名。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentEntry {
    /// 组件 ID（在单条消息内应唯一）
    pub id: ComponentId,
    /// 类型名到负载的映射
    pub component: IndexMap<String, ComponentPayload>,
}

/// 组件负载
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ComponentPayload {
    /// 组件数据
    #[serde(default)]
    pub data: Value,
    /// 组件选项
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

// ============================================================================
// 构建器
// ============================================================================

impl A2uiMessage {
    /// 创建 surfaceUpdate 消息
    pub fn surface_update(components: Vec<ComponentEntry>) -> Self {
        Self {
            surface_update: SurfaceUpdate { components },
        }
    }

    /// 转换为 JSON 值
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// 渲染为 ```json 围栏代码块，用于提示词示例
    pub fn to_fenced_block(&self) -> String {
        let body = serde_json::to_string_pretty(self).unwrap_or_default();
        format!("```json\n{}\n```", body)
    }
}

impl ComponentEntry {
    /// 创建组件条目
    pub fn new(id: impl Into<String>, type_name: impl Into<String>, data: Value) -> Self {
        let mut component = IndexMap::new();
        component.insert(
            type_name.into(),
            ComponentPayload {
                data,
                options: None,
            },
        );
        Self {
            id: id.into(),
            component,
        }
    }

    /// 设置选项（作用于唯一的类型负载）
    pub fn with_options(mut self, options: Value) -> Self {
        if let Some(payload) = self.component.values_mut().next() {
            payload.options = Some(options);
        }
        self
    }

    /// 获取类型名（仅当恰好有一个键时）
    pub fn type_name(&self) -> Option<&str> {
        if self.component.len() == 1 {
            self.component.keys().next().map(String::as_str)
        } else {
            None
        }
    }
}

/// 判断一个 JSON 值是否是 A2UI 信封（带 `surfaceUpdate` 键的对象）
pub fn is_envelope(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|obj| obj.contains_key(SURFACE_UPDATE_KEY))
}
