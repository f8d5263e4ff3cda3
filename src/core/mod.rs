//! Core business logic: the data model, the analytics engine and the chat relay.

pub mod analytics;
pub mod chat;
pub mod config;
pub mod kpi;
pub mod ledger;
pub mod log;
pub mod model;
pub mod period;

// Re-export main types for cleaner imports
pub use analytics::{RangeTotals, RatioKind, Series};
pub use chat::{AskRequest, AskResponse, ChatMessage, ChatModel, ChatRelay, Reply};
pub use kpi::{Dashboard, Delta, Trend};
pub use ledger::{EntryInput, Ledger};
pub use model::{Business, Entry};
pub use period::{BucketKey, Period};
