//! Background jobs and tasks.

mod activity_recorder;
mod announcement_schedule;
mod scheduler;

pub use activity_recorder::ActivityRecorder;
pub use announcement_schedule::AnnouncementScheduleJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
