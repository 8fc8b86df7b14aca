use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::SystemTime;
use uuid::Uuid;

use crate::db::DaoError;
use crate::models::flight::{Flight, FlightPatch, FlightWithOwner};
use crate::models::notification::{Notification, NotificationDraft};
use crate::models::user::{User, DEFAULT_TIMEZONE};
use crate::store::{
    oldest_visible_read_notification, FlightRepository, JobRegistry, NotificationRepository,
    UserDirectory,
};
use crate::time_window::TimeWindow;

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    flights: Vec<Flight>,
    notifications: Vec<Notification>,
    job_registry: HashMap<String, SystemTime>,
}

/// Process-local store with the same observable behavior as the Postgres DAOs. All tables
/// sit behind one lock, so every call is atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fully-formed notification, bypassing the proximity workflow. Used to seed
    /// data with arbitrary timestamps and read flags.
    pub fn insert_notification(&self, notification: Notification) -> Result<(), DaoError> {
        self.tables()?.notifications.push(notification);
        Ok(())
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, DaoError> {
        self.tables
            .lock()
            .map_err(|_| DaoError::CannotRunQuery("In-memory store lock was poisoned"))
    }
}

fn sort_by_time(flights: &mut [Flight]) {
    flights.sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.id.cmp(&b.id)));
}

impl FlightRepository for MemoryStore {
    fn create_flight(
        &self,
        owner_id: &str,
        name: &str,
        time: DateTime<Utc>,
    ) -> Result<Flight, DaoError> {
        let mut tables = self.tables()?;

        if !tables.users.contains_key(owner_id) {
            return Err(DaoError::CannotRunQuery(
                "Flight owner is not a registered user",
            ));
        }

        let flight = Flight {
            id: Uuid::now_v7(),
            user_id: String::from(owner_id),
            name: String::from(name),
            time,
            created_timestamp: Utc::now(),
        };

        tables.flights.push(flight.clone());
        Ok(flight)
    }

    fn get_flight(&self, flight_id: Uuid, owner_id: &str) -> Result<Flight, DaoError> {
        self.tables()?
            .flights
            .iter()
            .find(|f| f.id == flight_id && f.user_id == owner_id)
            .cloned()
            .ok_or_else(DaoError::not_found)
    }

    fn get_flights_by_owner(&self, owner_id: &str) -> Result<Vec<Flight>, DaoError> {
        let mut flights: Vec<Flight> = self
            .tables()?
            .flights
            .iter()
            .filter(|f| f.user_id == owner_id)
            .cloned()
            .collect();

        sort_by_time(&mut flights);
        Ok(flights)
    }

    fn get_owner_flights_in_window(
        &self,
        owner_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<Flight>, DaoError> {
        let mut flights: Vec<Flight> = self
            .tables()?
            .flights
            .iter()
            .filter(|f| f.user_id == owner_id && window.contains(f.time))
            .cloned()
            .collect();

        sort_by_time(&mut flights);
        Ok(flights)
    }

    fn get_flights_in_window(
        &self,
        window: &TimeWindow,
        excluded_owner_id: Option<&str>,
    ) -> Result<Vec<FlightWithOwner>, DaoError> {
        let tables = self.tables()?;

        let mut flights: Vec<Flight> = tables
            .flights
            .iter()
            .filter(|f| window.contains(f.time))
            .filter(|f| excluded_owner_id != Some(f.user_id.as_str()))
            .cloned()
            .collect();

        sort_by_time(&mut flights);

        // Inner join: flights whose owner row is missing are dropped
        Ok(flights
            .into_iter()
            .filter_map(|f| {
                let owner = tables.users.get(&f.user_id)?;

                Some(FlightWithOwner {
                    id: f.id,
                    owner_name: owner.name.clone(),
                    owner_email: owner.email.clone(),
                    user_id: f.user_id,
                    name: f.name,
                    time: f.time,
                })
            })
            .collect())
    }

    fn update_flight(
        &self,
        flight_id: Uuid,
        owner_id: &str,
        patch: &FlightPatch,
    ) -> Result<Flight, DaoError> {
        let mut tables = self.tables()?;

        let flight = tables
            .flights
            .iter_mut()
            .find(|f| f.id == flight_id && f.user_id == owner_id)
            .ok_or_else(DaoError::not_found)?;

        if let Some(name) = patch.name {
            flight.name = String::from(name);
        }

        if let Some(time) = patch.time {
            flight.time = time;
        }

        Ok(flight.clone())
    }

    fn delete_flight(&self, flight_id: Uuid, owner_id: &str) -> Result<(), DaoError> {
        let mut tables = self.tables()?;
        let count_before = tables.flights.len();

        tables
            .flights
            .retain(|f| !(f.id == flight_id && f.user_id == owner_id));

        if tables.flights.len() == count_before {
            return Err(DaoError::not_found());
        }

        Ok(())
    }
}

impl NotificationRepository for MemoryStore {
    fn create_notifications(&self, drafts: &[NotificationDraft]) -> Result<(), DaoError> {
        if drafts.is_empty() {
            return Ok(());
        }

        let mut tables = self.tables()?;

        if drafts
            .iter()
            .any(|d| !tables.users.contains_key(&d.recipient_id))
        {
            return Err(DaoError::CannotRunQuery(
                "Notification recipient is not a registered user",
            ));
        }

        let created_at = Utc::now();

        tables
            .notifications
            .extend(drafts.iter().map(|draft| Notification {
                id: Uuid::now_v7(),
                user_id: draft.recipient_id.clone(),
                message: draft.message.clone(),
                is_read: false,
                created_at,
            }));

        Ok(())
    }

    fn get_notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>, DaoError> {
        let oldest_visible_read = oldest_visible_read_notification(Utc::now());

        let mut notifications: Vec<Notification> = self
            .tables()?
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .filter(|n| !n.is_read || n.created_at >= oldest_visible_read)
            .cloned()
            .collect();

        notifications.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(notifications)
    }

    fn get_notification(
        &self,
        notification_id: Uuid,
        user_id: &str,
    ) -> Result<Notification, DaoError> {
        self.tables()?
            .notifications
            .iter()
            .find(|n| n.id == notification_id && n.user_id == user_id)
            .cloned()
            .ok_or_else(DaoError::not_found)
    }

    fn toggle_notification_read(
        &self,
        notification_id: Uuid,
        user_id: &str,
    ) -> Result<Notification, DaoError> {
        let mut tables = self.tables()?;

        let notification = tables
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id && n.user_id == user_id)
            .ok_or_else(DaoError::not_found)?;

        notification.is_read = !notification.is_read;
        Ok(notification.clone())
    }

    fn delete_read_notifications_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<usize, DaoError> {
        let mut tables = self.tables()?;
        let count_before = tables.notifications.len();

        tables
            .notifications
            .retain(|n| !(n.is_read && n.created_at < cutoff));

        Ok(count_before - tables.notifications.len())
    }
}

impl UserDirectory for MemoryStore {
    fn get_user(&self, user_id: &str) -> Result<User, DaoError> {
        self.tables()?
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(DaoError::not_found)
    }

    fn upsert_user(&self, user_id: &str, email: &str, name: &str) -> Result<User, DaoError> {
        let mut tables = self.tables()?;

        let user = tables
            .users
            .entry(String::from(user_id))
            .and_modify(|u| u.email = String::from(email))
            .or_insert_with(|| User {
                id: String::from(user_id),
                email: String::from(email),
                name: String::from(name),
                timezone: String::from(DEFAULT_TIMEZONE),
                created_timestamp: Utc::now(),
            });

        Ok(user.clone())
    }

    fn update_user_name(&self, user_id: &str, name: &str) -> Result<User, DaoError> {
        let mut tables = self.tables()?;
        let user = tables
            .users
            .get_mut(user_id)
            .ok_or_else(DaoError::not_found)?;

        user.name = String::from(name);
        Ok(user.clone())
    }

    fn update_user_timezone(&self, user_id: &str, timezone: &str) -> Result<User, DaoError> {
        let mut tables = self.tables()?;
        let user = tables
            .users
            .get_mut(user_id)
            .ok_or_else(DaoError::not_found)?;

        user.timezone = String::from(timezone);
        Ok(user.clone())
    }
}

impl JobRegistry for MemoryStore {
    fn get_job_last_run_timestamp(&self, job_name: &str) -> Result<Option<SystemTime>, DaoError> {
        Ok(self.tables()?.job_registry.get(job_name).copied())
    }

    fn set_job_last_run_timestamp(
        &self,
        job_name: &str,
        timestamp: SystemTime,
    ) -> Result<(), DaoError> {
        self.tables()?
            .job_registry
            .insert(String::from(job_name), timestamp);

        Ok(())
    }
}
