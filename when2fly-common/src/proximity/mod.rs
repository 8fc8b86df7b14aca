use chrono::Duration;
use std::collections::HashSet;

use crate::db::DaoError;
use crate::models::flight::{Flight, FlightWithOwner};
use crate::models::notification::NotificationDraft;
use crate::models::user::User;
use crate::store::{FlightRepository, NotificationRepository, UserDirectory};
use crate::time_window::TimeWindow;

pub mod templates;

use templates::{ExistingNearbyFlightMessage, NewNearbyFlightMessage};

pub const PROXIMITY_WINDOW_HOURS: i64 = 2;

/// Writes notifications between the creator of a new flight and the owners of other flights
/// scheduled within [`PROXIMITY_WINDOW_HOURS`] of it.
pub struct ProximityNotifier<'a> {
    flights: &'a dyn FlightRepository,
    notifications: &'a dyn NotificationRepository,
    users: &'a dyn UserDirectory,
}

impl<'a> ProximityNotifier<'a> {
    pub fn new(
        flights: &'a dyn FlightRepository,
        notifications: &'a dyn NotificationRepository,
        users: &'a dyn UserDirectory,
    ) -> Self {
        Self {
            flights,
            notifications,
            users,
        }
    }

    /// Returns the number of notifications written.
    pub fn notify_for_new_flight(&self, new_flight: &Flight) -> Result<usize, DaoError> {
        let window = TimeWindow::around_duration(
            new_flight.time,
            Duration::hours(PROXIMITY_WINDOW_HOURS),
        );

        let nearby_flights = self
            .flights
            .get_flights_in_window(&window, Some(&new_flight.user_id))?;

        if nearby_flights.is_empty() {
            return Ok(0);
        }

        let creator = self.users.get_user(&new_flight.user_id)?;
        let drafts = build_notifications(new_flight, &creator, &nearby_flights);

        self.notifications.create_notifications(&drafts)?;

        Ok(drafts.len())
    }
}

/// Nearby owners get one notification each, in the order their first flight appears. The
/// creator gets one notification per nearby flight, so an owner with two flights in the
/// window shows up twice on the creator's side.
pub fn build_notifications(
    new_flight: &Flight,
    creator: &User,
    nearby_flights: &[FlightWithOwner],
) -> Vec<NotificationDraft> {
    let mut notified_owners = HashSet::new();
    let mut drafts = Vec::with_capacity(nearby_flights.len() * 2);

    for nearby in nearby_flights {
        if nearby.user_id == new_flight.user_id || !notified_owners.insert(&nearby.user_id) {
            continue;
        }

        drafts.push(NotificationDraft {
            recipient_id: nearby.user_id.clone(),
            message: NewNearbyFlightMessage::generate(
                &new_flight.name,
                &creator.name,
                &creator.email,
                PROXIMITY_WINDOW_HOURS,
            ),
        });
    }

    for nearby in nearby_flights {
        if nearby.user_id == new_flight.user_id {
            continue;
        }

        drafts.push(NotificationDraft {
            recipient_id: new_flight.user_id.clone(),
            message: ExistingNearbyFlightMessage::generate(
                &nearby.owner_name,
                &nearby.owner_email,
                &nearby.name,
                PROXIMITY_WINDOW_HOURS,
            ),
        });
    }

    drafts
}
