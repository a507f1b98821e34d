//! Chat session domain module.
//!
//! One persisted session per coach, holding an append-only message log.

mod model;
mod repository;

pub use model::{AppendOutcome, ChatMessage, ChatSession, MessageRole};
pub use repository::ChatRepository;
