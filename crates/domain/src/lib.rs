//! Domain layer for the signage console backend.
//!
//! This crate contains:
//! - Domain models (Client, Group, Announcement, audience targets)
//! - The directory store that owns clients, groups and selection state
//! - The announcement board and delivery seam
//! - Domain error types

pub mod models;
pub mod services;
