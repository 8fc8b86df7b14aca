use uuid::Uuid;

use crate::models::notification::Notification;
use crate::service::ServiceError;
use crate::store::Store;

pub struct NotificationService<'a> {
    store: &'a Store,
}

impl<'a> NotificationService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub fn get_notifications(&self, user_id: &str) -> Result<Vec<Notification>, ServiceError> {
        Ok(self.store.notifications.get_notifications_for_user(user_id)?)
    }

    /// Flips the read flag of one of the caller's notifications.
    pub fn toggle_read(
        &self,
        user_id: &str,
        notification_id: Uuid,
    ) -> Result<Notification, ServiceError> {
        Ok(self
            .store
            .notifications
            .toggle_notification_read(notification_id, user_id)?)
    }
}
