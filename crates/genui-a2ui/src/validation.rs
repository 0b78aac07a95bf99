//! A2UI 消息验证
//!
//! 先检查信封和条目结构，再按目录 schema 验证已知类型的 `data` 与 `options`。
//! 验证从不失败：所有问题都以 [`InvalidEntry`] 的形式返回，条目之间互不影响。

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::Write as _;

use crate::catalog::Catalog;
use crate::common::{FieldError, PathSegment, PayloadTarget};
use crate::protocol::{COMPONENTS_KEY, SURFACE_UPDATE_KEY};

/// 通过验证的条目
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedEntry {
    /// 在 `components` 数组中的位置
    pub index: usize,
    pub id: String,
    pub type_name: String,
    pub data: Value,
    /// 已合并默认值的选项
    pub options: Value,
    /// 类型是否在目录中注册
    pub known: bool,
}

/// 未通过验证的条目
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidEntry {
    /// 信封本身无效时为 `None`
    pub index: Option<usize>,
    pub id: Option<String>,
    pub type_name: Option<String>,
    /// 原始条目（或整个信封）
    pub entry: Value,
    pub errors: Vec<FieldError>,
}

/// 整条消息的验证结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessageValidation {
    pub valid: Vec<ValidatedEntry>,
    pub invalid: Vec<InvalidEntry>,
}

impl MessageValidation {
    /// 是否全部通过
    pub fn is_clean(&self) -> bool {
        self.invalid.is_empty()
    }

    /// 已知类型的有效条目
    pub fn known(&self) -> impl Iterator<Item = &ValidatedEntry> {
        self.valid.iter().filter(|entry| entry.known)
    }

    /// 未注册类型的条目
    pub fn unknown(&self) -> impl Iterator<Item = &ValidatedEntry> {
        self.valid.iter().filter(|entry| !entry.known)
    }

    /// 生成可回传给模型用于自我纠正的错误说明；没有错误时返回 `None`
    pub fn feedback(&self) -> Option<String> {
        if self.invalid.is_empty() {
            return None;
        }

        let mut out = String::from("Some A2UI components were rejected:\n");
        for invalid in &self.invalid {
            let label = match (&invalid.id, &invalid.type_name) {
                (Some(id), Some(type_name)) => format!("component `{}` ({})", id, type_name),
                (Some(id), None) => format!("component `{}`", id),
                (None, _) => match invalid.index {
                    Some(index) => format!("component #{}", index),
                    None => "message".to_string(),
                },
            };
            let _ = writeln!(out, "- {}:", label);
            for error in &invalid.errors {
                let _ = writeln!(out, "  - {}", error);
            }
        }
        Some(out)
    }
}

/// 验证一条原始 A2UI 消息
pub fn validate_message(catalog: &Catalog, raw: &Value) -> MessageValidation {
    let components = match envelope_components(raw) {
        Ok(components) => components,
        Err(message) => {
            tracing::warn!(reason = %message, "rejected A2UI message envelope");
            return MessageValidation {
                valid: Vec::new(),
                invalid: vec![InvalidEntry {
                    index: None,
                    id: None,
                    type_name: None,
                    entry: raw.clone(),
                    errors: vec![FieldError::structural(
                        PayloadTarget::Message,
                        Vec::new(),
                        message,
                    )],
                }],
            };
        }
    };

    let mut result = MessageValidation::default();
    for (index, entry) in components.iter().enumerate() {
        match validate_entry(catalog, index, entry) {
            Ok(valid) => result.valid.push(valid),
            Err(invalid) => result.invalid.push(invalid),
        }
    }
    result
}

fn envelope_components(raw: &Value) -> Result<&Vec<Value>, String> {
    let object = raw
        .as_object()
        .ok_or_else(|| "message must be a JSON object".to_string())?;
    let update = object
        .get(SURFACE_UPDATE_KEY)
        .and_then(Value::as_object)
        .ok_or_else(|| format!("message must contain an object under `{}`", SURFACE_UPDATE_KEY))?;
    update
        .get(COMPONENTS_KEY)
        .and_then(Value::as_array)
        .ok_or_else(|| {
            format!(
                "`{}.{}` must be an array",
                SURFACE_UPDATE_KEY, COMPONENTS_KEY
            )
        })
}

fn validate_entry(catalog: &Catalog, index: usize, raw: &Value) -> Result<ValidatedEntry, InvalidEntry> {
    let invalid = |id: Option<&str>, type_name: Option<&str>, errors: Vec<FieldError>| InvalidEntry {
        index: Some(index),
        id: id.map(str::to_string),
        type_name: type_name.map(str::to_string),
        entry: raw.clone(),
        errors,
    };

    let Some(object) = raw.as_object() else {
        return Err(invalid(
            None,
            None,
            vec![FieldError::structural(
                PayloadTarget::Entry,
                vec![PathSegment::Index(index)],
                "component entry must be an object",
            )],
        ));
    };

    let id = object.get("id").and_then(Value::as_str);
    let anchor = match id {
        Some(id) => PathSegment::Key(id.to_string()),
        None => PathSegment::Index(index),
    };

    let mut errors = Vec::new();
    if id.is_none() {
        errors.push(FieldError::structural(
            PayloadTarget::Entry,
            vec![anchor.clone()],
            "component entry must have a string `id`",
        ));
    }

    let component = object.get("component").and_then(Value::as_object);
    let (type_name, payload) = match component.map(single_key) {
        Some(Ok((type_name, payload))) => (Some(type_name), Some(payload)),
        Some(Err(count)) => {
            errors.push(FieldError::structural(
                PayloadTarget::Entry,
                vec![anchor.clone()],
                format!(
                    "`component` must contain exactly one type name, found {}",
                    count
                ),
            ));
            (None, None)
        }
        None => {
            errors.push(FieldError::structural(
                PayloadTarget::Entry,
                vec![anchor.clone()],
                "component entry must have a `component` object",
            ));
            (None, None)
        }
    };

    let payload = match (type_name, payload) {
        (Some(_), Some(Value::Object(payload))) => Some(payload),
        (Some(type_name), Some(_)) => {
            errors.push(FieldError::structural(
                PayloadTarget::Entry,
                vec![anchor.clone(), PathSegment::Key(type_name.to_string())],
                "component payload must be an object with `data` and optional `options`",
            ));
            None
        }
        _ => None,
    };

    let (Some(id), Some(type_name), Some(payload), true) = (id, type_name, payload, errors.is_empty())
    else {
        tracing::warn!(index, ?id, ?type_name, "structurally invalid A2UI component entry");
        return Err(invalid(id, type_name, errors));
    };

    let data = match payload.get("data") {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(data) => data.clone(),
    };
    let options = payload.get("options");

    let Some(catalog_entry) = catalog.get(type_name) else {
        tracing::debug!(id, type_name, "unknown A2UI component type");
        let options = match options {
            Some(Value::Object(options)) => Value::Object(options.clone()),
            _ => Value::Object(Map::new()),
        };
        return Ok(ValidatedEntry {
            index,
            id: id.to_string(),
            type_name: type_name.to_string(),
            data,
            options,
            known: false,
        });
    };

    let mut errors = catalog_entry.validate_data(&data);
    let options = match catalog_entry.resolve_options(options) {
        Ok(options) => options,
        Err(option_errors) => {
            errors.extend(option_errors);
            Value::Null
        }
    };

    if !errors.is_empty() {
        tracing::warn!(
            id,
            type_name,
            errors = errors.len(),
            first = %errors[0],
            "A2UI component failed schema validation"
        );
        return Err(invalid(Some(id), Some(type_name), errors));
    }

    Ok(ValidatedEntry {
        index,
        id: id.to_string(),
        type_name: type_name.to_string(),
        data,
        options,
        known: true,
    })
}

/// 返回唯一的键值对，否则返回键数量
fn single_key(object: &Map<String, Value>) -> Result<(&str, &Value), usize> {
    let mut iter = object.iter();
    match (iter.next(), iter.next()) {
        (Some((key, value)), None) => Ok((key.as_str(), value)),
        _ => Err(object.len()),
    }
}
