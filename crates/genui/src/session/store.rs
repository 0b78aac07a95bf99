//! 生成结果存储抽象层
//!
//! 定义 `GenerationStore` trait 和 `AuthProvider` trait，
//! 由应用层注入具体的存储与认证实现。

use anyhow::Result;
use async_trait::async_trait;

use super::snapshot::SessionSnapshot;

/// 列表过滤条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotFilter {
    /// 只返回该用户的快照
    pub user_id: Option<String>,
    /// 标题包含该文本（不区分大小写）
    pub title_contains: Option<String>,
    /// 最多返回条数
    pub limit: Option<usize>,
}

impl SnapshotFilter {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, snapshot: &SessionSnapshot) -> bool {
        if let Some(user_id) = &self.user_id {
            if snapshot.user_id.as_deref() != Some(user_id.as_str()) {
                return false;
            }
        }
        if let Some(needle) = &self.title_contains {
            let needle = needle.to_lowercase();
            let title = snapshot.title.as_deref().unwrap_or_default().to_lowercase();
            if !title.contains(&needle) {
                return false;
            }
        }
        true
    }

    /// 过滤、按更新时间倒序排序并截断
    pub fn apply(&self, snapshots: impl IntoIterator<Item = SessionSnapshot>) -> Vec<SessionSnapshot> {
        let mut out: Vec<_> = snapshots.into_iter().filter(|s| self.matches(s)).collect();
        out.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        if let Some(limit) = self.limit {
            out.truncate(limit);
        }
        out
    }
}

/// 快照存储 trait
///
/// 框架提供内存实现 (`InMemoryStore`) 和文件实现 (`FileStore`)。
#[async_trait]
pub trait GenerationStore: Send + Sync {
    /// 保存快照（同 id 覆盖），返回 id
    async fn save(&self, snapshot: &SessionSnapshot) -> Result<String>;

    /// 获取快照
    async fn get(&self, id: &str) -> Result<Option<SessionSnapshot>>;

    /// 列出快照
    async fn list(&self, filter: &SnapshotFilter) -> Result<Vec<SessionSnapshot>>;

    /// 删除快照，返回是否存在
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// 认证 trait
pub trait AuthProvider: Send + Sync {
    /// 当前用户；未登录时为 `None`
    fn current_user_id(&self) -> Option<String>;
}

/// 固定用户的认证实现
#[derive(Debug, Clone, Default)]
pub struct StaticAuth {
    user_id: Option<String>,
}

impl StaticAuth {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl AuthProvider for StaticAuth {
    fn current_user_id(&self) -> Option<String> {
        self.user_id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn snapshot(user: &str, title: &str, age_minutes: i64) -> SessionSnapshot {
        let mut snapshot = SessionSnapshot::new().with_title(title);
        snapshot.user_id = Some(user.to_string());
        snapshot.updated_at -= Duration::minutes(age_minutes);
        snapshot
    }

    #[test]
    fn test_filter_scopes_sorts_and_limits() {
        let snapshots = vec![
            snapshot("alice", "Old trip", 30),
            snapshot("bob", "Budget", 1),
            snapshot("alice", "New trip", 5),
            snapshot("alice", "Groceries", 10),
        ];

        let filter = SnapshotFilter {
            title_contains: Some("TRIP".into()),
            ..SnapshotFilter::for_user("alice")
        };
        let titles: Vec<_> = filter
            .apply(snapshots.clone())
            .into_iter()
            .filter_map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["New trip", "Old trip"]);

        let limited = SnapshotFilter::for_user("alice").with_limit(1).apply(snapshots);
        assert_eq!(limited[0].title.as_deref(), Some("New trip"));
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_static_auth() {
        assert_eq!(StaticAuth::user("u1").current_user_id().as_deref(), Some("u1"));
        assert_eq!(StaticAuth::anonymous().current_user_id(), None);
    }
}
