//! Data-sharing consent flag.
//!
//! A single persisted boolean. It starts false, becomes true only through
//! explicit acceptance and is never reset by the application afterwards.

/// Persistence for the one-way consent flag.
#[async_trait::async_trait]
pub trait ConsentRepository: Send + Sync {
    /// Whether the user has accepted. Missing or unreadable data reads as false.
    async fn has_consented(&self) -> bool;

    /// Records acceptance.
    async fn set_consented(&self) -> crate::error::Result<()>;
}
