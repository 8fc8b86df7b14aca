use chrono::{DateTime, Utc};
use diesel::{AsChangeset, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::flights;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Identifiable, Queryable)]
#[diesel(table_name = flights)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Flight {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub time: DateTime<Utc>,
    pub created_timestamp: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = flights)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewFlight<'a> {
    pub id: Uuid,
    pub user_id: &'a str,
    pub name: &'a str,
    pub time: DateTime<Utc>,
    pub created_timestamp: DateTime<Utc>,
}

/// Partial update of a flight. `None` fields are left untouched.
#[derive(Clone, Copy, Debug, Default, AsChangeset)]
#[diesel(table_name = flights)]
pub struct FlightPatch<'a> {
    pub name: Option<&'a str>,
    pub time: Option<DateTime<Utc>>,
}

impl FlightPatch<'_> {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.time.is_none()
    }
}

/// A flight joined with its owner's display name and email.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Queryable)]
pub struct FlightWithOwner {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub time: DateTime<Utc>,
    pub owner_name: String,
    pub owner_email: String,
}
