//! Session service
//!
//! Combines a [`GenerationStore`] with an [`AuthProvider`]: every call runs
//! as the current user and can only see that user's snapshots.

use std::sync::Arc;
use thiserror::Error;

use super::snapshot::SessionSnapshot;
use super::store::{AuthProvider, GenerationStore, SnapshotFilter};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no authenticated user")]
    Unauthenticated,

    #[error("session {0} belongs to another user")]
    Forbidden(String),

    #[error("session {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn GenerationStore>,
    auth: Arc<dyn AuthProvider>,
}

impl SessionService {
    pub fn new(store: Arc<dyn GenerationStore>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { store, auth }
    }

    fn current_user(&self) -> Result<String, SessionError> {
        self.auth
            .current_user_id()
            .ok_or(SessionError::Unauthenticated)
    }

    /// Save as the current user and return the id
    ///
    /// Overwriting a snapshot owned by someone else is refused.
    pub async fn save(&self, mut snapshot: SessionSnapshot) -> Result<String, SessionError> {
        let user = self.current_user()?;
        if let Some(existing) = self.store.get(&snapshot.id).await? {
            if existing.user_id.as_deref() != Some(user.as_str()) {
                return Err(SessionError::Forbidden(snapshot.id));
            }
            snapshot.created_at = existing.created_at;
        }
        snapshot.user_id = Some(user);
        snapshot.touch();
        let id = self.store.save(&snapshot).await?;
        tracing::debug!(id = %id, messages = snapshot.messages.len(), "session saved");
        Ok(id)
    }

    pub async fn get(&self, id: &str) -> Result<SessionSnapshot, SessionError> {
        let user = self.current_user()?;
        let snapshot = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        if snapshot.user_id.as_deref() != Some(user.as_str()) {
            return Err(SessionError::Forbidden(id.to_string()));
        }
        Ok(snapshot)
    }

    /// List the current user's snapshots; the filter's user is overridden
    pub async fn list(&self, filter: SnapshotFilter) -> Result<Vec<SessionSnapshot>, SessionError> {
        let user = self.current_user()?;
        let filter = SnapshotFilter {
            user_id: Some(user),
            ..filter
        };
        Ok(self.store.list(&filter).await?)
    }

    /// Delete one of the current user's snapshots. `false` if it did not exist.
    pub async fn delete(&self, id: &str) -> Result<bool, SessionError> {
        match self.get(id).await {
            Ok(_) => Ok(self.store.delete(id).await?),
            Err(SessionError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }
}
