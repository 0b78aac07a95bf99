//! A2UI 组件目录
//!
//! 把组件类型名映射到验证器、提示词说明和渲染绑定。目录在启动时构建一次，
//! 之后只读；需要共享时以 `Arc<Catalog>` 传递。

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::common::{FieldError, PayloadTarget};
use crate::error::{CatalogError, RenderError};
use crate::node::RenderedNode;
use crate::protocol::{A2uiMessage, ComponentEntry};
use crate::schema::{JsonSchemaValidator, PayloadValidator};

/// 传给渲染绑定的组件属性
#[derive(Debug, Clone, Copy)]
pub struct ComponentProps<'a> {
    pub id: &'a str,
    pub type_name: &'a str,
    pub data: &'a Value,
    pub options: &'a Value,
}

/// 渲染绑定
pub type RenderFn =
    Arc<dyn Fn(&ComponentProps<'_>) -> Result<RenderedNode, RenderError> + Send + Sync>;

/// 目录条目
#[derive(Clone)]
pub struct CatalogEntry {
    type_name: String,
    purpose: String,
    example: Value,
    schema: Arc<dyn PayloadValidator>,
    options_schema: Option<Arc<dyn PayloadValidator>>,
    default_options: Map<String, Value>,
    render: Option<RenderFn>,
}

impl fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogEntry")
            .field("type_name", &self.type_name)
            .field("purpose", &self.purpose)
            .field("has_options_schema", &self.options_schema.is_some())
            .field("has_render", &self.render.is_some())
            .finish()
    }
}

impl CatalogEntry {
    /// 使用任意验证器创建条目
    pub fn new(
        type_name: impl Into<String>,
        purpose: impl Into<String>,
        schema: impl PayloadValidator + 'static,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            purpose: purpose.into(),
            example: json!({}),
            schema: Arc::new(schema),
            options_schema: None,
            default_options: Map::new(),
            render: None,
        }
    }

    /// 从带 `JsonSchema` 派生的数据类型创建条目
    pub fn typed<D: JsonSchema>(
        type_name: impl Into<String>,
        purpose: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        Ok(Self::new(
            type_name,
            purpose,
            JsonSchemaValidator::for_type::<D>()?,
        ))
    }

    /// 设置选项验证器
    pub fn with_options_schema(mut self, schema: impl PayloadValidator + 'static) -> Self {
        self.options_schema = Some(Arc::new(schema));
        self
    }

    /// 从带 `JsonSchema` 派生的选项类型设置选项验证器
    pub fn with_typed_options<O: JsonSchema>(self) -> Result<Self, CatalogError> {
        Ok(self.with_options_schema(JsonSchemaValidator::for_type::<O>()?))
    }

    /// 设置最小示例数据
    pub fn with_example(mut self, example: Value) -> Self {
        self.example = example;
        self
    }

    /// 设置默认选项（未提供的键取默认值）
    pub fn with_default_options(mut self, defaults: Map<String, Value>) -> Self {
        self.default_options = defaults;
        self
    }

    /// 设置渲染绑定
    pub fn with_render<F>(mut self, render: F) -> Self
    where
        F: Fn(&ComponentProps<'_>) -> Result<RenderedNode, RenderError> + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    pub fn example(&self) -> &Value {
        &self.example
    }

    pub fn render_fn(&self) -> Option<&RenderFn> {
        self.render.as_ref()
    }

    /// 数据 schema（若验证器基于 JSON Schema）
    pub fn data_schema(&self) -> Option<&Value> {
        self.schema.json_schema()
    }

    /// 验证 `data`
    pub fn validate_data(&self, data: &Value) -> Vec<FieldError> {
        self.schema.validate(data, PayloadTarget::Data)
    }

    /// 合并默认选项并验证 `options`
    ///
    /// 未提供选项时视为 `{}`。没有选项 schema 时只要求是对象。
    pub fn resolve_options(&self, options: Option<&Value>) -> Result<Value, Vec<FieldError>> {
        let mut merged = self.default_options.clone();
        match options {
            None | Some(Value::Null) => {}
            Some(Value::Object(given)) => {
                for (key, value) in given {
                    merged.insert(key.clone(), value.clone());
                }
            }
            Some(other) => {
                return Err(vec![FieldError::schema(
                    PayloadTarget::Options,
                    Vec::new(),
                    format!("{} is not of type \"object\"", other),
                )]);
            }
        }

        let merged = Value::Object(merged);
        let errors = match &self.options_schema {
            Some(schema) => schema.validate(&merged, PayloadTarget::Options),
            None => Vec::new(),
        };
        if errors.is_empty() {
            Ok(merged)
        } else {
            Err(errors)
        }
    }

    /// 提示词说明：类型名、一句话用途和最小示例消息
    pub fn describe(&self) -> String {
        let example = A2uiMessage::surface_update(vec![ComponentEntry::new(
            format!("{}-1", self.type_name.to_lowercase()),
            self.type_name.clone(),
            self.example.clone(),
        )]);
        let example = serde_json::to_string(&example).unwrap_or_default();
        format!(
            "### {}\n{}\nExample:\n```json\n{}\n```",
            self.type_name, self.purpose, example
        )
    }
}

/// 提示词生成选项
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptOptions {
    /// 附带每个类型的数据 JSON Schema
    pub include_schemas: bool,
}

const PROMPT_HEADER: &str = "You can render interactive UI components by emitting a fenced ```json block \
containing an A2UI message:\n\
{\"surfaceUpdate\":{\"components\":[{\"id\":\"<unique id>\",\"component\":{\"<TypeName>\":{\"data\":{...},\"options\":{...}}}}]}}\n\
Each entry has exactly one type name under \"component\". Reusing an id replaces that component in place.\n\
Available component types:";

/// 组件目录
#[derive(Clone, Default)]
pub struct Catalog {
    entries: IndexMap<String, CatalogEntry>,
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}

impl Catalog {
    /// 创建空目录
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建包含标准组件的目录
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        if let Err(err) = crate::standard::register_standard(&mut catalog) {
            tracing::error!(error = %err, "failed to register standard A2UI components");
        }
        catalog
    }

    /// 注册条目；同名条目被替换并返回旧值
    pub fn register(&mut self, entry: CatalogEntry) -> Result<Option<CatalogEntry>, CatalogError> {
        let name = entry.type_name.clone();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(CatalogError::InvalidTypeName(name));
        }
        let replaced = self.entries.insert(name.clone(), entry);
        if replaced.is_some() {
            tracing::debug!(type_name = %name, "replaced catalog entry");
        }
        Ok(replaced)
    }

    /// 按类型名查找
    pub fn get(&self, type_name: &str) -> Option<&CatalogEntry> {
        self.entries.get(type_name)
    }

    /// 是否已注册
    pub fn has(&self, type_name: &str) -> bool {
        self.entries.contains_key(type_name)
    }

    /// 按注册顺序列出类型名
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// 按注册顺序列出条目
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 生成目录提示词（每次调用都重新生成）
    pub fn prompt_catalog_text(&self) -> String {
        self.prompt_catalog_text_with(PromptOptions::default())
    }

    /// 按选项生成目录提示词
    pub fn prompt_catalog_text_with(&self, options: PromptOptions) -> String {
        if self.entries.is_empty() {
            return String::new();
        }

        let mut text = String::from(PROMPT_HEADER);
        for entry in self.entries.values() {
            text.push_str("\n\n");
            text.push_str(&entry.describe());
            if options.include_schemas {
                if let Some(schema) = entry.data_schema() {
                    let schema = serde_json::to_string(schema).unwrap_or_default();
                    text.push_str(&format!("\nData schema:\n```json\n{}\n```", schema));
                }
            }
        }
        text.push('\n');
        text
    }
}

static STANDARD_CATALOG: Lazy<Arc<Catalog>> = Lazy::new(|| Arc::new(Catalog::standard()));

/// 进程级共享的标准目录（首次使用时构建）
pub fn standard_catalog() -> Arc<Catalog> {
    Arc::clone(&STANDARD_CATALOG)
}
