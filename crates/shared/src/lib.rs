//! Shared utilities and common types for the signage console backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Common validation logic
//! - Page-based pagination
//! - Case-insensitive search matching

pub mod pagination;
pub mod search;
pub mod validation;
