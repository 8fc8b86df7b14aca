use chrono::Utc;
use diesel::{dsl, ExpressionMethods, QueryDsl, RunQueryDsl};

use crate::db::{DaoError, DbThreadPool};
use crate::models::user::{NewUser, User, DEFAULT_TIMEZONE};
use crate::schema::users as user_fields;
use crate::schema::users::dsl::users;
use crate::store::UserDirectory;

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

impl UserDirectory for Dao {
    fn get_user(&self, user_id: &str) -> Result<User, DaoError> {
        Ok(users
            .find(user_id)
            .get_result::<User>(&mut self.db_thread_pool.get()?)?)
    }

    fn upsert_user(&self, user_id: &str, email: &str, name: &str) -> Result<User, DaoError> {
        let new_user = NewUser {
            id: user_id,
            email,
            name,
            timezone: DEFAULT_TIMEZONE,
            created_timestamp: Utc::now(),
        };

        // The display name is user-editable, so only the email follows the identity provider
        Ok(dsl::insert_into(users)
            .values(&new_user)
            .on_conflict(user_fields::id)
            .do_update()
            .set(user_fields::email.eq(email))
            .get_result::<User>(&mut self.db_thread_pool.get()?)?)
    }

    fn update_user_name(&self, user_id: &str, name: &str) -> Result<User, DaoError> {
        Ok(dsl::update(users.find(user_id))
            .set(user_fields::name.eq(name))
            .get_result::<User>(&mut self.db_thread_pool.get()?)?)
    }

    fn update_user_timezone(&self, user_id: &str, timezone: &str) -> Result<User, DaoError> {
        Ok(dsl::update(users.find(user_id))
            .set(user_fields::timezone.eq(timezone))
            .get_result::<User>(&mut self.db_thread_pool.get()?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::db::test_utils;

    #[test]
    #[ignore = "requires a Postgres database configured through WHEN2FLY_DB_* variables"]
    fn test_upsert_keeps_chosen_name() {
        let dao = Dao::new(test_utils::db_pool());
        let user = test_utils::create_user();
        assert_eq!(user.timezone, DEFAULT_TIMEZONE);

        dao.update_user_name(&user.id, "Chosen Name").unwrap();
        dao.update_user_timezone(&user.id, "America/Los_Angeles")
            .unwrap();

        let new_email = format!("new-{}", user.email);
        let relogged = dao
            .upsert_user(&user.id, &new_email, "Provider Name")
            .unwrap();

        assert_eq!(relogged.name, "Chosen Name");
        assert_eq!(relogged.email, new_email);
        assert_eq!(relogged.timezone, "America/Los_Angeles");
        assert_eq!(relogged.created_timestamp, user.created_timestamp);
    }

    #[test]
    #[ignore = "requires a Postgres database configured through WHEN2FLY_DB_* variables"]
    fn test_missing_user_is_not_found() {
        let dao = Dao::new(test_utils::db_pool());

        assert!(dao.get_user("no-such-user").unwrap_err().is_not_found());
        assert!(dao
            .update_user_name("no-such-user", "Name")
            .unwrap_err()
            .is_not_found());
    }
}
