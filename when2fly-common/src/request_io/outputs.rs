use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::flight::{Flight, FlightWithOwner};
use crate::models::notification::Notification;
use crate::models::user::User;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum ErrorType {
    IncorrectlyFormed,
    BadToken,
    TokenExpired,
    TokenMissing,
    UserDisallowed,
    UserDoesNotExist,
    FlightDoesNotExist,
    NotificationDoesNotExist,
    InternalError,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ServerErrorResponse {
    pub err_type: ErrorType,
    pub err_message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputFlight {
    pub id: Uuid,
    pub name: String,
    pub time: DateTime<Utc>,
    pub user_id: String,
}

impl From<Flight> for OutputFlight {
    fn from(flight: Flight) -> Self {
        Self {
            id: flight.id,
            name: flight.name,
            time: flight.time,
            user_id: flight.user_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct OutputFlightOwner {
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputFlightWithOwner {
    pub id: Uuid,
    pub name: String,
    pub time: DateTime<Utc>,
    pub user_id: String,
    pub users: OutputFlightOwner,
}

impl From<FlightWithOwner> for OutputFlightWithOwner {
    fn from(flight: FlightWithOwner) -> Self {
        Self {
            id: flight.id,
            name: flight.name,
            time: flight.time,
            user_id: flight.user_id,
            users: OutputFlightOwner {
                name: flight.owner_name,
                email: flight.owner_email,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct OutputNotification {
    pub id: Uuid,
    pub message: String,
    #[serde(rename = "isRead")]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for OutputNotification {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id,
            message: notification.message,
            is_read: notification.is_read,
            created_at: notification.created_at,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OutputNotificationToggled {
    pub message: String,
    pub notification: OutputNotification,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct OutputUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub timezone: String,
}

impl From<User> for OutputUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            timezone: user.timezone,
        }
    }
}
