use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable};
use serde::{Deserialize, Serialize};

use crate::schema::users;

pub const DEFAULT_TIMEZONE: &str = "UTC";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Identifiable, Queryable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    /// External identity key (the Google account subject).
    pub id: String,
    pub email: String,
    pub name: String,
    pub timezone: String,
    pub created_timestamp: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewUser<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub name: &'a str,
    pub timezone: &'a str,
    pub created_timestamp: DateTime<Utc>,
}
