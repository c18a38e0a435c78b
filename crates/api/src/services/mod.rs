//! Orchestration across the shared stores.

pub mod dispatch;

pub use dispatch::{broadcast_announcement, record_activity, send_announcement, SendOutcome};
