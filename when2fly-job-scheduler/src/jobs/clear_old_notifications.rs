use when2fly_common::store::{NotificationRepository, READ_NOTIFICATION_VISIBILITY_DAYS};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::jobs::{Job, JobError};

/// Deletes read notifications once they are older than the retention period. Unread
/// notifications are kept regardless of age.
pub struct ClearOldNotificationsJob {
    notifications: Arc<dyn NotificationRepository>,
    max_read_notification_age: Duration,
    is_running: bool,
}

impl ClearOldNotificationsJob {
    /// Retention shorter than the period read notifications stay visible is raised to it.
    pub fn new(notifications: Arc<dyn NotificationRepository>, retention_days: u64) -> Self {
        let retention_days = i64::try_from(retention_days)
            .unwrap_or(i64::MAX)
            .clamp(READ_NOTIFICATION_VISIBILITY_DAYS, 36500);

        Self {
            notifications,
            max_read_notification_age: Duration::days(retention_days),
            is_running: false,
        }
    }
}

#[async_trait]
impl Job for ClearOldNotificationsJob {
    fn name(&self) -> &'static str {
        "Clear Old Notifications"
    }

    fn is_ready(&self) -> bool {
        !self.is_running
    }

    async fn execute(&mut self) -> Result<(), JobError> {
        self.is_running = true;

        let cutoff = Utc::now() - self.max_read_notification_age;
        let notifications = Arc::clone(&self.notifications);

        let result = tokio::task::spawn_blocking(move || {
            notifications.delete_read_notifications_older_than(cutoff)
        })
        .await;

        self.is_running = false;

        let deleted_count = result??;
        log::info!("Deleted {deleted_count} read notification(s) older than {cutoff}");

        Ok(())
    }
}
