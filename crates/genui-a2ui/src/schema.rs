//! 组件负载验证器
//!
//! `PayloadValidator` 是目录条目与验证逻辑之间的接缝。默认实现基于
//! JSON Schema：schema 由 `schemars` 从带类型的 Rust 结构体推导，
//! 再用 `jsonschema` 编译，一次性收集全部错误而不是遇错即停。

use jsonschema::Validator;
use schemars::JsonSchema;
use serde_json::Value;

use crate::common::{FieldError, PathSegment, PayloadTarget};
use crate::error::CatalogError;

/// 负载验证器
pub trait PayloadValidator: Send + Sync {
    /// 验证负载，返回所有失败字段；空列表表示通过
    fn validate(&self, value: &Value, target: PayloadTarget) -> Vec<FieldError>;

    /// 若验证器基于 JSON Schema，返回该 schema（用于提示词）
    fn json_schema(&self) -> Option<&Value> {
        None
    }
}

impl<F> PayloadValidator for F
where
    F: Fn(&Value, PayloadTarget) -> Vec<FieldError> + Send + Sync,
{
    fn validate(&self, value: &Value, target: PayloadTarget) -> Vec<FieldError> {
        self(value, target)
    }
}

/// 基于 JSON Schema 的验证器
pub struct JsonSchemaValidator {
    schema: Value,
    compiled: Validator,
}

impl std::fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSchemaValidator")
            .field("schema", &self.schema)
            .finish()
    }
}

impl JsonSchemaValidator {
    /// 从手写 JSON Schema 创建
    pub fn new(schema: Value) -> Result<Self, CatalogError> {
        let compiled = jsonschema::validator_for(&schema)
            .map_err(|e| CatalogError::InvalidSchema(e.to_string()))?;
        Ok(Self { schema, compiled })
    }

    /// 从带 `JsonSchema` 派生的类型创建
    pub fn for_type<T: JsonSchema>() -> Result<Self, CatalogError> {
        let schema = serde_json::to_value(schemars::schema_for!(T))
            .map_err(|e| CatalogError::SchemaGeneration(e.to_string()))?;
        Self::new(schema)
    }

    /// 原始 schema
    pub fn schema(&self) -> &Value {
        &self.schema
    }
}

impl PayloadValidator for JsonSchemaValidator {
    fn validate(&self, value: &Value, target: PayloadTarget) -> Vec<FieldError> {
        self.compiled
            .iter_errors(value)
            .map(|err| {
                let pointer = err.instance_path.to_string();
                FieldError::schema(target, pointer_to_path(value, &pointer), err.to_string())
            })
            .collect()
    }

    fn json_schema(&self) -> Option<&Value> {
        Some(&self.schema)
    }
}

/// 把 JSON Pointer 转换为字段路径
///
/// 数字段是否为数组下标取决于实例中该位置的实际值，
/// 因此 `{"0": ...}` 这样的对象键不会被误判为下标。
pub fn pointer_to_path(instance: &Value, pointer: &str) -> Vec<PathSegment> {
    let mut current = Some(instance);
    let mut path = Vec::new();

    for raw in pointer.split('/').skip(1) {
        let token = raw.replace("~1", "/").replace("~0", "~");
        let segment = match current {
            Some(Value::Array(items)) => match token.parse::<usize>() {
                Ok(idx) => {
                    current = items.get(idx);
                    PathSegment::Index(idx)
                }
                Err(_) => {
                    current = None;
                    PathSegment::Key(token)
                }
            },
            Some(Value::Object(map)) => {
                current = map.get(&token);
                PathSegment::Key(token)
            }
            _ => {
                current = None;
                PathSegment::Key(token)
            }
        };
        path.push(segment);
    }

    path
}
