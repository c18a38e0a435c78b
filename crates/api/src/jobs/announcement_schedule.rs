//! Periodic sweep that moves announcements through their schedule.

use chrono::Utc;
use domain::models::{ActivityLevel, AnnouncementStatus};
use domain::services::{ActivityLog, AnnouncementBoard};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::scheduler::{Job, JobFrequency};
use crate::middleware::metrics::record_schedule_transitions;

const ACTIVITY_SOURCE: &str = "scheduler";

/// Activates scheduled announcements whose publish date has passed and
/// completes announcements past their expiration date.
pub struct AnnouncementScheduleJob {
    announcements: Arc<RwLock<AnnouncementBoard>>,
    activity: Arc<RwLock<ActivityLog>>,
    interval_secs: u64,
}

impl AnnouncementScheduleJob {
    pub fn new(
        announcements: Arc<RwLock<AnnouncementBoard>>,
        activity: Arc<RwLock<ActivityLog>>,
        interval_secs: u64,
    ) -> Self {
        Self {
            announcements,
            activity,
            interval_secs,
        }
    }

    /// Runs one sweep and returns the number of announcements that changed status.
    pub async fn sweep(&self) -> usize {
        let transitions = self.announcements.write().await.apply_schedule(Utc::now());
        if transitions.is_empty() {
            return 0;
        }

        let mut activity = self.activity.write().await;
        for transition in &transitions {
            let verb = match transition.to {
                AnnouncementStatus::Active => "is now active",
                AnnouncementStatus::Completed => "has expired",
                _ => "changed status",
            };
            activity.record(
                ActivityLevel::Info,
                format!("Announcement \"{}\" {}", transition.title, verb),
                ACTIVITY_SOURCE,
            );
        }

        record_schedule_transitions(transitions.len());
        debug!(count = transitions.len(), "Schedule transitions logged");
        transitions.len()
    }
}

#[async_trait::async_trait]
impl Job for AnnouncementScheduleJob {
    fn name(&self) -> &'static str {
        "announcement_schedule"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(self.interval_secs)
    }

    async fn execute(&self) -> Result<(), String> {
        self.sweep().await;
        Ok(())
    }
}
