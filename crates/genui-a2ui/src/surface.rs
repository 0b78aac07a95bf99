//! Surface 状态归约
//!
//! Surface 是按 id 索引、有序的组件集合。所有操作都是纯函数：输入旧状态，
//! 返回新状态，调用方可以自由合并或丢弃中间状态。

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::Catalog;
use crate::validation::{validate_message, MessageValidation, ValidatedEntry};

/// Surface 中的一个组件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceEntry {
    pub id: String,
    pub type_name: String,
    pub data: Value,
    pub options: Value,
    /// 类型是否在目录中注册；未注册的条目以回退形式渲染
    pub known: bool,
    /// 首次插入的序号，替换时保持不变
    pub seq: u64,
}

/// 有序的组件树
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceState {
    entries: IndexMap<String, SurfaceEntry>,
    next_seq: u64,
}

impl SurfaceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 应用一条已验证的消息
    ///
    /// 已有 id 整体替换但保持位置；新 id 按消息顺序追加；
    /// 无效条目不影响 Surface。
    pub fn apply_message(&self, message: &MessageValidation) -> Self {
        self.apply_entries(&message.valid)
    }

    /// 应用一组已验证条目
    pub fn apply_entries(&self, entries: &[ValidatedEntry]) -> Self {
        let mut next = self.clone();
        for entry in entries {
            next.upsert(entry);
        }
        next
    }

    /// 依次应用多条消息
    pub fn apply_all<'a, I>(&self, messages: I) -> Self
    where
        I: IntoIterator<Item = &'a MessageValidation>,
    {
        messages
            .into_iter()
            .fold(self.clone(), |state, message| state.apply_message(message))
    }

    /// 验证原始消息后应用，同时返回验证结果
    pub fn apply_raw(&self, catalog: &Catalog, raw: &Value) -> (Self, MessageValidation) {
        let validation = validate_message(catalog, raw);
        (self.apply_message(&validation), validation)
    }

    /// 清空 Surface
    pub fn reset(&self) -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&SurfaceEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// 按渲染顺序遍历
    pub fn ordered(&self) -> impl Iterator<Item = &SurfaceEntry> {
        self.entries.values()
    }

    /// 按渲染顺序列出 id
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn upsert(&mut self, entry: &ValidatedEntry) {
        if let Some(existing) = self.entries.get_mut(&entry.id) {
            existing.type_name = entry.type_name.clone();
            existing.data = entry.data.clone();
            existing.options = entry.options.clone();
            existing.known = entry.known;
            return;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            entry.id.clone(),
            SurfaceEntry {
                id: entry.id.clone(),
                type_name: entry.type_name.clone(),
                data: entry.data.clone(),
                options: entry.options.clone(),
                known: entry.known,
                seq,
            },
        );
    }
}
