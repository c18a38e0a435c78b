//! Domain models for the signage console.

pub mod activity;
pub mod announcement;
pub mod audience;
pub mod client;
pub mod group;
pub mod overview;
pub mod patch;

pub use activity::{ActivityEntry, ActivityLevel};
pub use announcement::{
    Announcement, AnnouncementPatch, AnnouncementPriority, AnnouncementQuery, AnnouncementStatus,
    BroadcastRequest, CreateAnnouncementRequest, SortDirection, SortField,
};
pub use audience::{AudienceTarget, ResolvedAudience};
pub use client::{Client, ClientPatch, ClientStatus, CreateClientRequest};
pub use group::{CreateGroupRequest, Group, GroupPatch};
pub use overview::StatusSummary;
pub use patch::FieldUpdate;
