//! Coach repository trait.

use super::model::Coach;
use crate::error::Result;

/// Persistence for user-authored coaches.
///
/// Built-in coaches are never stored. Reads degrade to an empty list when
/// the persisted collection is missing or unreadable.
#[async_trait::async_trait]
pub trait CoachRepository: Send + Sync {
    /// Appends a coach to the persisted collection. Duplicate ids are not rejected.
    async fn save_custom_coach(&self, coach: &Coach) -> Result<()>;

    /// Removes every coach with the given id. Absent ids are a no-op.
    async fn delete_custom_coach(&self, id: &str) -> Result<()>;

    /// Returns the persisted collection in insertion order.
    async fn list_custom_coaches(&self) -> Vec<Coach>;

    async fn find_custom_coach(&self, id: &str) -> Option<Coach> {
        self.list_custom_coaches()
            .await
            .into_iter()
            .find(|coach| coach.id == id)
    }
}
