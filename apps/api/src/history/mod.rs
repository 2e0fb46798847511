// Analysis history: an append-only, newest-first list of past analyses kept
// under one namespaced key in a pluggable key-value store.

pub mod handlers;
pub mod service;
pub mod store;

pub use service::HistoryService;
pub use store::{FileKvStore, InMemoryKvStore, KvStore};
