//! Background task that turns directory change events into activity entries.

use domain::models::ActivityLevel;
use domain::services::{ActivityLog, DirectoryStore, StoreEvent};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch, RwLock};
use tracing::{debug, info, warn};

use crate::middleware::metrics::{
    record_directory_size, record_events_lagged, record_store_mutation,
};

/// Consumes directory events until shutdown or until the store is dropped.
pub struct ActivityRecorder {
    directory: Arc<RwLock<DirectoryStore>>,
    activity: Arc<RwLock<ActivityLog>>,
    events: broadcast::Receiver<StoreEvent>,
}

impl ActivityRecorder {
    /// Subscribes to the directory. Events published after this call are recorded.
    pub async fn subscribe(
        directory: Arc<RwLock<DirectoryStore>>,
        activity: Arc<RwLock<ActivityLog>>,
    ) -> Self {
        let events = directory.read().await.subscribe();
        Self {
            directory,
            activity,
            events,
        }
    }

    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("Activity recorder started");

        loop {
            tokio::select! {
                received = self.events.recv() => match received {
                    Ok(event) => self.handle(&event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Activity recorder fell behind directory events");
                        record_events_lagged(skipped);
                        self.activity.write().await.record(
                            ActivityLevel::Warning,
                            format!("{} directory change(s) were not recorded", skipped),
                            "directory",
                        );
                    }
                    Err(RecvError::Closed) => {
                        info!("Directory event channel closed");
                        break;
                    }
                },
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Activity recorder shutting down");
                        break;
                    }
                }
            }
        }
    }

    async fn handle(&self, event: &StoreEvent) {
        debug!(revision = event.revision, kind = event.change.kind(), "Directory event");
        record_store_mutation(event.change.kind());

        if !event.change.is_selection() {
            let (clients, groups) = {
                let directory = self.directory.read().await;
                (directory.clients().len(), directory.groups().len())
            };
            record_directory_size(clients, groups);
        }

        self.activity.write().await.record_event(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::{CreateClientRequest, CreateGroupRequest};
    use std::time::Duration;

    async fn wait_for_entries(activity: &Arc<RwLock<ActivityLog>>, count: usize) {
        for _ in 0..50 {
            if activity.read().await.len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_records_directory_changes() {
        let directory = Arc::new(RwLock::new(DirectoryStore::new()));
        let activity = Arc::new(RwLock::new(ActivityLog::with_capacity(50)));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let recorder = ActivityRecorder::subscribe(directory.clone(), activity.clone()).await;
        let handle = tokio::spawn(recorder.run(shutdown_rx));

        {
            let mut store = directory.write().await;
            let client = store.add_client(CreateClientRequest::named("LB467-1")).unwrap();
            store.add_group(CreateGroupRequest::named("Lobby"));
            store.select_client(&client.id, true).unwrap();
        }

        wait_for_entries(&activity, 2).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        // Selection changes stay out of the log.
        assert_eq!(activity.read().await.len(), 2);
    }

    #[tokio::test]
    async fn test_lagged_events_leave_a_warning() {
        let directory = Arc::new(RwLock::new(DirectoryStore::with_event_buffer(1)));
        let activity = Arc::new(RwLock::new(ActivityLog::with_capacity(50)));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let recorder = ActivityRecorder::subscribe(directory.clone(), activity.clone()).await;
        {
            let mut store = directory.write().await;
            for name in ["A-1", "A-2", "A-3"] {
                store.add_client(CreateClientRequest::named(name)).unwrap();
            }
        }
        let handle = tokio::spawn(recorder.run(shutdown_rx));

        wait_for_entries(&activity, 2).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        let log = activity.read().await;
        let warnings = log.list(Some(ActivityLevel::Warning), None, Default::default());
        assert_eq!(warnings.data.len(), 1);
        assert!(warnings.data[0].message.starts_with("2 directory change"));
    }
}
