//! User context repository trait.

use super::model::UserContext;
use crate::error::Result;

#[async_trait::async_trait]
pub trait UserContextRepository: Send + Sync {
    /// Replaces the stored record wholesale.
    async fn save_user_context(&self, context: &UserContext) -> Result<()>;

    /// Returns the stored record, or `None` if never saved or unreadable.
    async fn get_user_context(&self) -> Option<UserContext>;
}
