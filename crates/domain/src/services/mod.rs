//! Domain services for the signage console.
//!
//! Services own the in-memory state and the rules that keep it consistent.

pub mod activity;
pub mod announcement_board;
pub mod directory;
pub mod events;
pub mod notification;
pub mod seed;

pub use activity::{ActivityLog, DEFAULT_ACTIVITY_CAPACITY};
pub use announcement_board::{AnnouncementBoard, AnnouncementError, StatusCounts, StatusTransition};
pub use directory::{DirectoryError, DirectorySnapshot, DirectoryStore, DEFAULT_EVENT_BUFFER};
pub use events::{StoreChange, StoreEvent};
pub use notification::{AnnouncementDelivery, AnnouncementPayload, DeliveryResult, MockDelivery};
