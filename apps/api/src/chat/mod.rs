// Follow-up chat: per-analysis conversations with a streaming assistant
// reply. One question may be in flight per session at a time.

pub mod channel;
pub mod handlers;
pub mod session;
