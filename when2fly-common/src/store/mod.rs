use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use std::time::SystemTime;
use uuid::Uuid;

use crate::db::{self, DaoError, DbThreadPool};
use crate::models::flight::{Flight, FlightPatch, FlightWithOwner};
use crate::models::notification::{Notification, NotificationDraft};
use crate::models::user::User;
use crate::time_window::TimeWindow;

pub mod memory;

pub use memory::MemoryStore;

/// Read notifications stay visible to their recipient for this many days.
pub const READ_NOTIFICATION_VISIBILITY_DAYS: i64 = 7;

pub fn oldest_visible_read_notification(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(READ_NOTIFICATION_VISIBILITY_DAYS)
}

/// Every operation that addresses a single flight is scoped by owner. A flight owned by
/// someone else is reported as not found.
pub trait FlightRepository: Send + Sync {
    fn create_flight(
        &self,
        owner_id: &str,
        name: &str,
        time: DateTime<Utc>,
    ) -> Result<Flight, DaoError>;

    fn get_flight(&self, flight_id: Uuid, owner_id: &str) -> Result<Flight, DaoError>;

    fn get_flights_by_owner(&self, owner_id: &str) -> Result<Vec<Flight>, DaoError>;

    fn get_owner_flights_in_window(
        &self,
        owner_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<Flight>, DaoError>;

    /// Flights of every owner except `excluded_owner_id`, joined with owner name and email.
    fn get_flights_in_window(
        &self,
        window: &TimeWindow,
        excluded_owner_id: Option<&str>,
    ) -> Result<Vec<FlightWithOwner>, DaoError>;

    fn update_flight(
        &self,
        flight_id: Uuid,
        owner_id: &str,
        patch: &FlightPatch,
    ) -> Result<Flight, DaoError>;

    fn delete_flight(&self, flight_id: Uuid, owner_id: &str) -> Result<(), DaoError>;
}

pub trait NotificationRepository: Send + Sync {
    /// Inserts the whole batch or nothing. An empty batch is not written.
    fn create_notifications(&self, drafts: &[NotificationDraft]) -> Result<(), DaoError>;

    /// Unread notifications plus those created within the visibility window, newest first.
    fn get_notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>, DaoError>;

    fn get_notification(
        &self,
        notification_id: Uuid,
        user_id: &str,
    ) -> Result<Notification, DaoError>;

    /// Flips the read flag in a single write and returns the updated row.
    fn toggle_notification_read(
        &self,
        notification_id: Uuid,
        user_id: &str,
    ) -> Result<Notification, DaoError>;

    fn delete_read_notifications_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<usize, DaoError>;
}

pub trait UserDirectory: Send + Sync {
    fn get_user(&self, user_id: &str) -> Result<User, DaoError>;

    /// Creates the user on first login. An existing user only has their email refreshed.
    fn upsert_user(&self, user_id: &str, email: &str, name: &str) -> Result<User, DaoError>;

    fn update_user_name(&self, user_id: &str, name: &str) -> Result<User, DaoError>;

    fn update_user_timezone(&self, user_id: &str, timezone: &str) -> Result<User, DaoError>;
}

pub trait JobRegistry: Send + Sync {
    fn get_job_last_run_timestamp(&self, job_name: &str) -> Result<Option<SystemTime>, DaoError>;

    fn set_job_last_run_timestamp(
        &self,
        job_name: &str,
        timestamp: SystemTime,
    ) -> Result<(), DaoError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl StorageBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StorageBackend::Postgres => "postgres",
            StorageBackend::Memory => "memory",
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("Unknown storage backend '{other}'")),
        }
    }
}

#[derive(Clone)]
pub struct Store {
    pub backend: StorageBackend,
    pub flights: Arc<dyn FlightRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub users: Arc<dyn UserDirectory>,
    pub job_registry: Arc<dyn JobRegistry>,
}

impl Store {
    pub fn postgres(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            backend: StorageBackend::Postgres,
            flights: Arc::new(db::flight::Dao::new(db_thread_pool)),
            notifications: Arc::new(db::notification::Dao::new(db_thread_pool)),
            users: Arc::new(db::user::Dao::new(db_thread_pool)),
            job_registry: Arc::new(db::job_registry::Dao::new(db_thread_pool)),
        }
    }

    pub fn in_memory(memory_store: Arc<MemoryStore>) -> Self {
        Self {
            backend: StorageBackend::Memory,
            flights: memory_store.clone(),
            notifications: memory_store.clone(),
            users: memory_store.clone(),
            job_registry: memory_store,
        }
    }
}
