use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::notifications;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Identifiable, Queryable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Notification {
    pub id: Uuid,
    pub user_id: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewNotification<'a> {
    pub id: Uuid,
    pub user_id: &'a str,
    pub message: &'a str,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// A notification that has not been persisted yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotificationDraft {
    pub recipient_id: String,
    pub message: String,
}
