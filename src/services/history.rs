use std::sync::Arc;

use uuid::Uuid;

use crate::errors::Result;
use crate::models::{GenerationHistory, NewHistoryRecord};
use crate::repositories::HistoryRepository;

/// Per-user generation history capped at `limit` rows.
#[derive(Clone)]
pub struct HistoryStore {
    repo: Arc<dyn HistoryRepository>,
    limit: i64,
}

impl HistoryStore {
    pub fn new(repo: Arc<dyn HistoryRepository>, limit: i64) -> Self {
        Self {
            repo,
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub async fn record(&self, record: &NewHistoryRecord) -> Result<GenerationHistory> {
        let saved = self.repo.insert_and_trim(record, self.limit).await?;
        tracing::debug!(
            "Saved {} history {} for user {}",
            saved.kind,
            saved.id,
            saved.user_id
        );
        Ok(saved)
    }

    /// Newest first.
    pub async fn recent(&self, user_id: Uuid) -> Result<Vec<GenerationHistory>> {
        self.repo.recent(user_id, self.limit).await
    }

    /// Best effort: a rendering is still returned to the client when the
    /// history update fails.
    pub async fn attach_birdview(&self, user_id: Uuid, image: &str) {
        match self.repo.attach_birdview(user_id, image).await {
            Ok(true) => tracing::debug!("Attached rendering to latest layout of user {}", user_id),
            Ok(false) => tracing::debug!("User {} has no layout history to attach to", user_id),
            Err(e) => tracing::warn!("Failed to attach rendering for user {}: {}", user_id, e),
        }
    }
}
