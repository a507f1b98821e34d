pub mod kv;
pub mod paths;
pub mod session_store;
pub mod storage;

pub use crate::kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, open_store};
pub use crate::session_store::KvSessionStore;
