//! A2UI 通用类型定义
//!
//! 组件 ID、字段路径与字段级验证错误

use serde::{Deserialize, Serialize};
use std::fmt;

/// 组件唯一标识符
pub type ComponentId = String;

/// 字段路径中的一段
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// 对象键
    Key(String),
    /// 数组下标
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(idx) => write!(f, "[{}]", idx),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        PathSegment::Key(s.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(s: String) -> Self {
        PathSegment::Key(s)
    }
}

impl From<usize> for PathSegment {
    fn from(idx: usize) -> Self {
        PathSegment::Index(idx)
    }
}

/// 把路径格式化为 `events.[0].start_date.year` 形式，空路径为 `<root>`
pub fn format_path(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return "<root>".to_string();
    }
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// 错误所针对的负载部分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadTarget {
    /// 整条消息信封
    Message,
    /// 单个组件条目的结构
    Entry,
    /// 组件 `data`
    Data,
    /// 组件 `options`
    Options,
}

impl fmt::Display for PayloadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PayloadTarget::Message => "message",
            PayloadTarget::Entry => "entry",
            PayloadTarget::Data => "data",
            PayloadTarget::Options => "options",
        };
        f.write_str(name)
    }
}

/// 验证错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// 信封或条目结构错误
    Structural,
    /// 已知类型的负载不符合 schema
    Schema,
}

/// 字段级验证错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// 错误类别
    pub kind: ErrorKind,
    /// 路径所相对的负载部分
    pub target: PayloadTarget,
    /// 字段路径
    pub path: Vec<PathSegment>,
    /// 错误信息
    pub message: String,
}

impl FieldError {
    /// 创建结构错误
    pub fn structural(
        target: PayloadTarget,
        path: Vec<PathSegment>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: ErrorKind::Structural,
            target,
            path,
            message: message.into(),
        }
    }

    /// 创建 schema 错误
    pub fn schema(target: PayloadTarget, path: Vec<PathSegment>, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Schema,
            target,
            path,
            message: message.into(),
        }
    }

    /// 格式化后的路径
    pub fn display_path(&self) -> String {
        format_path(&self.path)
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.target, self.display_path(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_path() {
        let path = vec![
            PathSegment::from("events"),
            PathSegment::from(0usize),
            PathSegment::from("start_date"),
            PathSegment::from("year"),
        ];
        assert_eq!(format_path(&path), "events.[0].start_date.year");
        assert_eq!(format_path(&[]), "<root>");
    }

    #[test]
    fn test_field_error_display() {
        let err = FieldError::schema(
            PayloadTarget::Data,
            vec!["title".into()],
            "expected object",
        );
        assert_eq!(err.to_string(), "data title: expected object");
        assert_eq!(err.kind, ErrorKind::Schema);
    }

    #[test]
    fn test_path_segment_serializes_untagged() {
        let path = vec![PathSegment::from("rows"), PathSegment::from(3usize)];
        assert_eq!(
            serde_json::to_value(&path).unwrap(),
            serde_json::json!(["rows", 3])
        );
    }
}
