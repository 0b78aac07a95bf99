//! A2UI 标准组件目录
//!
//! 每个组件的数据形状以带类型的结构体描述，schema 由 `schemars` 推导。
//! 这些结构体只用于生成 schema 和在宿主端反序列化；验证始终针对原始 JSON。

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::catalog::{Catalog, CatalogEntry};
use crate::error::CatalogError;

// ============================================================================
// Timeline
// ============================================================================

/// 时间线数据
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct TimelineData {
    /// 标题页
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<TimelineSlide>,
    /// 事件列表
    pub events: Vec<TimelineEvent>,
}

/// 标题页
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct TimelineSlide {
    pub text: TimelineText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<TimelineMedia>,
}

/// 时间线文本
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct TimelineText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// 时间线事件
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct TimelineEvent {
    pub start_date: TimelineDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<TimelineDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TimelineText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<TimelineMedia>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// 时间线日期
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct TimelineDate {
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u8>,
}

/// 时间线媒体
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct TimelineMedia {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

// ============================================================================
// DataTable
// ============================================================================

/// 表格数据
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct DataTableData {
    pub columns: Vec<DataTableColumn>,
    pub rows: Vec<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// 表格列
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct DataTableColumn {
    pub key: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<ColumnAlign>,
}

/// 列对齐方式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ColumnAlign {
    Left,
    Center,
    Right,
}

/// 表格选项
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataTableOptions {
    #[serde(default)]
    pub sortable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

// ============================================================================
// StatCard
// ============================================================================

/// 指标卡数据
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct StatCardData {
    pub label: String,
    pub value: StatValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
}

/// 指标值（数字或已格式化文本）
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(untagged)]
pub enum StatValue {
    Number(f64),
    Text(String),
}

/// 趋势方向
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

// ============================================================================
// Callout
// ============================================================================

/// 提示框数据
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CalloutData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub body: String,
}

/// 提示框选项
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CalloutOptions {
    #[serde(default = "default_tone")]
    pub tone: Tone,
}

/// 提示框语气
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Info,
    Success,
    Warning,
    Danger,
}

fn default_tone() -> Tone {
    Tone::Info
}

// ============================================================================
// LinkPreview
// ============================================================================

/// 链接预览数据
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct LinkPreviewData {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

// ============================================================================
// OptionList
// ============================================================================

/// 选项列表数据
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct OptionListData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    pub options: Vec<OptionItem>,
}

/// 单个选项
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct OptionItem {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// 选项列表选项
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OptionListOptions {
    #[serde(default = "default_selection")]
    pub selection: SelectionMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_selections: Option<u32>,
}

/// 选择模式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    Single,
    Multiple,
}

fn default_selection() -> SelectionMode {
    SelectionMode::Single
}

// ============================================================================
// 注册
// ============================================================================

fn defaults(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// 向目录注册全部标准组件
pub fn register_standard(catalog: &mut Catalog) -> Result<(), CatalogError> {
    catalog.register(
        CatalogEntry::typed::<TimelineData>(
            "Timeline",
            "A chronological timeline of dated events with an optional title slide.",
        )?
        .with_example(json!({
            "title": { "text": { "headline": "Project history" } },
            "events": [
                { "start_date": { "year": 2020 }, "text": { "headline": "Founded" } }
            ]
        })),
    )?;

    catalog.register(
        CatalogEntry::typed::<DataTableData>(
            "DataTable",
            "A table of rows under labelled columns; row keys match column keys.",
        )?
        .with_typed_options::<DataTableOptions>()?
        .with_default_options(defaults(json!({ "sortable": false })))
        .with_example(json!({
            "columns": [
                { "key": "name", "label": "Name" },
                { "key": "stars", "label": "Stars", "align": "right" }
            ],
            "rows": [{ "name": "serde", "stars": 9000 }]
        })),
    )?;

    catalog.register(
        CatalogEntry::typed::<StatCardData>(
            "StatCard",
            "A single headline metric with optional unit, delta and trend.",
        )?
        .with_example(json!({ "label": "Revenue", "value": 1200, "unit": "USD", "trend": "up" })),
    )?;

    catalog.register(
        CatalogEntry::typed::<CalloutData>(
            "Callout",
            "A highlighted note; options.tone is info, success, warning or danger.",
        )?
        .with_typed_options::<CalloutOptions>()?
        .with_default_options(defaults(json!({ "tone": "info" })))
        .with_example(json!({ "title": "Heads up", "body": "Rates change on Monday." })),
    )?;

    catalog.register(
        CatalogEntry::typed::<LinkPreviewData>(
            "LinkPreview",
            "A rich preview card for a URL.",
        )?
        .with_example(json!({ "url": "https://www.rust-lang.org", "title": "Rust" })),
    )?;

    catalog.register(
        CatalogEntry::typed::<OptionListData>(
            "OptionList",
            "A list of choices the user can pick from; options.selection is single or multiple.",
        )?
        .with_typed_options::<OptionListOptions>()?
        .with_default_options(defaults(json!({ "selection": "single" })))
        .with_example(json!({
            "prompt": "Pick a plan",
            "options": [{ "id": "basic", "label": "Basic" }, { "id": "pro", "label": "Pro" }]
        })),
    )?;

    Ok(())
}
