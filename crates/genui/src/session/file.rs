//! 文件快照存储
//!
//! 每个快照一个 JSON 文件：`<data_dir>/<id>.json`。

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::snapshot::SessionSnapshot;
use super::store::{GenerationStore, SnapshotFilter};

/// 基于目录的快照存储
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 快照文件路径；id 只允许字母、数字、`-` 和 `_`
    fn path_for(&self, id: &str) -> Result<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            bail!("invalid snapshot id {:?}", id);
        }
        Ok(self.dir.join(format!("{}.json", id)))
    }
}

#[async_trait]
impl GenerationStore for FileStore {
    async fn save(&self, snapshot: &SessionSnapshot) -> Result<String> {
        let path = self.path_for(&snapshot.id)?;
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create {}", self.dir.display()))?;

        let data = serde_json::to_string_pretty(snapshot).context("failed to serialize snapshot")?;
        // 先写临时文件再改名，避免读到写了一半的快照
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, data)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        if let Err(err) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(err)
                .with_context(|| format!("failed to move snapshot into {}", path.display()));
        }

        tracing::debug!(id = %snapshot.id, path = %path.display(), "snapshot saved");
        Ok(snapshot.id.clone())
    }

    async fn get(&self, id: &str) -> Result<Option<SessionSnapshot>> {
        let path = self.path_for(id)?;
        let data = match fs::read_to_string(&path).await {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", path.display()))
            }
        };
        let snapshot = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Some(snapshot))
    }

    async fn list(&self, filter: &SnapshotFilter) -> Result<Vec<SessionSnapshot>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", self.dir.display()))
            }
        };

        let mut snapshots = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            let data = match fs::read_to_string(&path).await {
                Ok(data) => data,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping unreadable snapshot");
                    continue;
                }
            };
            match serde_json::from_str::<SessionSnapshot>(&data) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping corrupt snapshot");
                }
            }
        }
        Ok(filter.apply(snapshots))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let path = self.path_for(id)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err).with_context(|| format!("failed to delete {}", path.display())),
        }
    }
}
