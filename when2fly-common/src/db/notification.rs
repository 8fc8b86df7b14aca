use chrono::{DateTime, Utc};
use diesel::{dsl, BoolExpressionMethods, ExpressionMethods, QueryDsl, RunQueryDsl};
use uuid::Uuid;

use crate::db::{DaoError, DbThreadPool};
use crate::models::notification::{NewNotification, Notification, NotificationDraft};
use crate::schema::notifications as notification_fields;
use crate::schema::notifications::dsl::notifications;
use crate::store::{oldest_visible_read_notification, NotificationRepository};

pub struct Dao {
    db_thread_pool: DbThreadPool,
}

impl Dao {
    pub fn new(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            db_thread_pool: db_thread_pool.clone(),
        }
    }
}

impl NotificationRepository for Dao {
    fn create_notifications(&self, drafts: &[NotificationDraft]) -> Result<(), DaoError> {
        if drafts.is_empty() {
            return Ok(());
        }

        let created_at = Utc::now();
        let new_notifications: Vec<NewNotification> = drafts
            .iter()
            .map(|draft| NewNotification {
                id: Uuid::now_v7(),
                user_id: &draft.recipient_id,
                message: &draft.message,
                is_read: false,
                created_at,
            })
            .collect();

        // A single multi-row INSERT, so the batch lands entirely or not at all
        dsl::insert_into(notifications)
            .values(&new_notifications)
            .execute(&mut self.db_thread_pool.get()?)?;

        Ok(())
    }

    fn get_notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>, DaoError> {
        let oldest_visible_read = oldest_visible_read_notification(Utc::now());

        Ok(notifications
            .filter(notification_fields::user_id.eq(user_id))
            .filter(
                notification_fields::is_read
                    .eq(false)
                    .or(notification_fields::created_at.ge(oldest_visible_read)),
            )
            .order((
                notification_fields::created_at.desc(),
                notification_fields::id.desc(),
            ))
            .load::<Notification>(&mut self.db_thread_pool.get()?)?)
    }

    fn get_notification(
        &self,
        notification_id: Uuid,
        user_id: &str,
    ) -> Result<Notification, DaoError> {
        Ok(notifications
            .find(notification_id)
            .filter(notification_fields::user_id.eq(user_id))
            .first::<Notification>(&mut self.db_thread_pool.get()?)?)
    }

    fn toggle_notification_read(
        &self,
        notification_id: Uuid,
        user_id: &str,
    ) -> Result<Notification, DaoError> {
        Ok(dsl::update(
            notifications
                .find(notification_id)
                .filter(notification_fields::user_id.eq(user_id)),
        )
        .set(notification_fields::is_read.eq(dsl::not(notification_fields::is_read)))
        .get_result::<Notification>(&mut self.db_thread_pool.get()?)?)
    }

    fn delete_read_notifications_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<usize, DaoError> {
        Ok(diesel::delete(
            notifications
                .filter(notification_fields::is_read.eq(true))
                .filter(notification_fields::created_at.lt(cutoff)),
        )
        .execute(&mut self.db_thread_pool.get()?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;

    use crate::db::test_utils;

    fn insert(user_id: &str, is_read: bool, age: Duration) -> Uuid {
        let id = Uuid::now_v7();
        let new_notification = NewNotification {
            id,
            user_id,
            message: "seeded",
            is_read,
            created_at: Utc::now() - age,
        };

        dsl::insert_into(notifications)
            .values(&new_notification)
            .execute(&mut test_utils::db_pool().get().unwrap())
            .unwrap();

        id
    }

    #[test]
    #[ignore = "requires a Postgres database configured through WHEN2FLY_DB_* variables"]
    fn test_empty_batch_is_noop() {
        let dao = Dao::new(test_utils::db_pool());
        dao.create_notifications(&[]).unwrap();
    }

    #[test]
    #[ignore = "requires a Postgres database configured through WHEN2FLY_DB_* variables"]
    fn test_read_filter_and_toggle() {
        let dao = Dao::new(test_utils::db_pool());
        let user = test_utils::create_user();

        let old_read = insert(&user.id, true, Duration::days(8));
        let old_unread = insert(&user.id, false, Duration::days(20));
        let recent_read = insert(&user.id, true, Duration::days(1));

        let ids: Vec<Uuid> = dao
            .get_notifications_for_user(&user.id)
            .unwrap()
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, vec![recent_read, old_unread]);
        assert!(!ids.contains(&old_read));

        let toggled = dao.toggle_notification_read(old_unread, &user.id).unwrap();
        assert!(toggled.is_read);
        assert!(!dao.toggle_notification_read(old_unread, &user.id).unwrap().is_read);
        assert!(dao
            .toggle_notification_read(old_unread, "someone-else")
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    #[ignore = "requires a Postgres database configured through WHEN2FLY_DB_* variables"]
    fn test_batch_insert_and_purge() {
        let dao = Dao::new(test_utils::db_pool());
        let user = test_utils::create_user();

        dao.create_notifications(&[
            NotificationDraft {
                recipient_id: user.id.clone(),
                message: String::from("one"),
            },
            NotificationDraft {
                recipient_id: user.id.clone(),
                message: String::from("two"),
            },
        ])
        .unwrap();
        assert_eq!(dao.get_notifications_for_user(&user.id).unwrap().len(), 2);

        let purged = insert(&user.id, true, Duration::days(90));
        dao.delete_read_notifications_older_than(Utc::now() - Duration::days(30))
            .unwrap();
        assert!(dao.get_notification(purged, &user.id).unwrap_err().is_not_found());
        assert_eq!(dao.get_notifications_for_user(&user.id).unwrap().len(), 2);
    }
}
