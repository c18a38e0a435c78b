//! HTTP route handlers.

pub mod announcements;
pub mod clients;
pub mod groups;
pub mod health;
pub mod logs;
pub mod overview;
pub mod selection;
