use uuid::Uuid;

use crate::models::flight::{Flight, FlightPatch, FlightWithOwner};
use crate::proximity::ProximityNotifier;
use crate::service::ServiceError;
use crate::store::Store;
use crate::time_window::TimeWindow;
use crate::validators::{self, Validity};

pub struct FlightService<'a> {
    store: &'a Store,
}

impl<'a> FlightService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Persists the flight and then notifies owners of nearby flights. The two writes are
    /// not atomic: if notifying fails the error is returned even though the flight has
    /// already been saved.
    pub fn create_flight(
        &self,
        owner_id: &str,
        name: Option<&str>,
        time: Option<&str>,
    ) -> Result<Flight, ServiceError> {
        let name = required_field("name", name)?.trim();
        let time = required_field("time", time)?;

        if let Validity::Invalid(msg) = validators::validate_flight_name(name) {
            return Err(ServiceError::Validation(msg));
        }

        let time = validators::parse_timestamp(time).map_err(ServiceError::Validation)?;

        let flight = self.store.flights.create_flight(owner_id, name, time)?;

        let notifier = ProximityNotifier::new(
            self.store.flights.as_ref(),
            self.store.notifications.as_ref(),
            self.store.users.as_ref(),
        );

        match notifier.notify_for_new_flight(&flight) {
            Ok(count) => {
                log::info!(
                    "Flight {} created with {} proximity notification(s)",
                    flight.id,
                    count
                );
            }
            Err(e) => {
                log::error!(
                    "Flight {} was saved but proximity notifications failed: {e}",
                    flight.id
                );
                return Err(ServiceError::Dependency(e));
            }
        }

        Ok(flight)
    }

    pub fn get_flight(&self, owner_id: &str, flight_id: Uuid) -> Result<Flight, ServiceError> {
        Ok(self.store.flights.get_flight(flight_id, owner_id)?)
    }

    pub fn get_flights_by_owner(&self, owner_id: &str) -> Result<Vec<Flight>, ServiceError> {
        Ok(self.store.flights.get_flights_by_owner(owner_id)?)
    }

    /// A missing or blank field is left unchanged. Editing never re-runs proximity
    /// notifications.
    pub fn update_flight(
        &self,
        owner_id: &str,
        flight_id: Uuid,
        name: Option<&str>,
        time: Option<&str>,
    ) -> Result<Flight, ServiceError> {
        let name = name.map(str::trim).filter(|n| !n.is_empty());
        let time = time.map(str::trim).filter(|t| !t.is_empty());

        if let Some(name) = name {
            if let Validity::Invalid(msg) = validators::validate_flight_name(name) {
                return Err(ServiceError::Validation(msg));
            }
        }

        let patch = FlightPatch {
            name,
            time: time
                .map(validators::parse_timestamp)
                .transpose()
                .map_err(ServiceError::Validation)?,
        };

        if patch.is_empty() {
            return self.get_flight(owner_id, flight_id);
        }

        Ok(self.store.flights.update_flight(flight_id, owner_id, &patch)?)
    }

    pub fn delete_flight(&self, owner_id: &str, flight_id: Uuid) -> Result<(), ServiceError> {
        Ok(self.store.flights.delete_flight(flight_id, owner_id)?)
    }

    pub fn get_own_flights_near(
        &self,
        owner_id: &str,
        time: Option<&str>,
        interval_hours: Option<f64>,
    ) -> Result<Vec<Flight>, ServiceError> {
        let window = window_from_query(time, interval_hours)?;
        Ok(self
            .store
            .flights
            .get_owner_flights_in_window(owner_id, &window)?)
    }

    pub fn get_all_flights_near(
        &self,
        time: Option<&str>,
        interval_hours: Option<f64>,
    ) -> Result<Vec<FlightWithOwner>, ServiceError> {
        let window = window_from_query(time, interval_hours)?;
        Ok(self.store.flights.get_flights_in_window(&window, None)?)
    }
}

fn required_field<'v>(field: &str, value: Option<&'v str>) -> Result<&'v str, ServiceError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ServiceError::Validation(format!(
            "Missing required field '{field}'"
        ))),
    }
}

fn window_from_query(
    time: Option<&str>,
    interval_hours: Option<f64>,
) -> Result<TimeWindow, ServiceError> {
    let time = required_field("time", time)?;
    let time = validators::parse_timestamp(time).map_err(ServiceError::Validation)?;

    let Some(interval_hours) = interval_hours else {
        return Err(ServiceError::Validation(String::from(
            "Missing required field 'interval'",
        )));
    };

    TimeWindow::around(time, interval_hours)
        .map_err(|e| ServiceError::Validation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::Arc;

    use crate::store::test_utils::UnavailableNotifications;
    use crate::store::{MemoryStore, NotificationRepository, UserDirectory};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, hour, 0, 0).unwrap()
    }

    fn store_with_users(ids: &[&str]) -> Store {
        let memory_store = Arc::new(MemoryStore::new());

        for id in ids {
            memory_store
                .upsert_user(id, &format!("{id}@g.ucla.edu"), &id.to_uppercase())
                .unwrap();
        }

        Store::in_memory(memory_store)
    }

    #[test]
    fn test_create_flight() {
        let store = store_with_users(&["a"]);
        let service = FlightService::new(&store);

        let flight = service
            .create_flight("a", Some("  UA 100 "), Some("2025-01-01T12:00:00Z"))
            .unwrap();

        assert_eq!(flight.name, "UA 100");
        assert_eq!(flight.time, at(12));
        assert_eq!(flight.user_id, "a");
        assert_eq!(service.get_flight("a", flight.id).unwrap(), flight);
    }

    #[test]
    fn test_validation_happens_before_persistence() {
        let store = store_with_users(&["a"]);
        let service = FlightService::new(&store);

        for (name, time) in [
            (None, Some("2025-01-01T12:00:00Z")),
            (Some("UA 100"), None),
            (Some(""), Some("2025-01-01T12:00:00Z")),
            (Some("UA 100"), Some("   ")),
            (Some("UA 100"), Some("noon-ish")),
        ] {
            assert!(matches!(
                service.create_flight("a", name, time),
                Err(ServiceError::Validation(_))
            ));
        }

        assert!(service.get_flights_by_owner("a").unwrap().is_empty());
    }

    #[test]
    fn test_missing_field_message_names_the_field() {
        let store = store_with_users(&["a"]);
        let service = FlightService::new(&store);

        let Err(ServiceError::Validation(msg)) = service.create_flight("a", Some("UA 1"), None)
        else {
            panic!("Expected a validation error");
        };

        assert!(msg.contains("'time'"));
    }

    #[test]
    fn test_create_fails_together_with_notifications() {
        let memory_store = Arc::new(MemoryStore::new());
        memory_store.upsert_user("a", "a@g.ucla.edu", "A").unwrap();
        memory_store.upsert_user("b", "b@g.ucla.edu", "B").unwrap();

        let store = Store {
            notifications: Arc::new(UnavailableNotifications {}),
            ..Store::in_memory(Arc::clone(&memory_store))
        };
        let service = FlightService::new(&store);

        service
            .create_flight("b", Some("B1"), Some("2025-01-01T11:00:00Z"))
            .unwrap();

        let result = service.create_flight("a", Some("A1"), Some("2025-01-01T12:00:00Z"));
        assert!(matches!(result, Err(ServiceError::Dependency(_))));

        // The flight row was committed before the notification write failed
        assert_eq!(service.get_flights_by_owner("a").unwrap().len(), 1);
        assert!(memory_store.get_notifications_for_user("b").unwrap().is_empty());
    }

    #[test]
    fn test_unregistered_owner_cannot_create_flight() {
        let store = store_with_users(&["b"]);
        let service = FlightService::new(&store);

        assert!(matches!(
            service.create_flight("ghost", Some("G1"), Some("2025-01-01T12:00:00Z")),
            Err(ServiceError::Dependency(_))
        ));
    }

    #[test]
    fn test_update_flight() {
        let store = store_with_users(&["a", "b"]);
        let service = FlightService::new(&store);
        let flight = service
            .create_flight("a", Some("UA 100"), Some("2025-01-01T12:00:00Z"))
            .unwrap();

        let unchanged = service.update_flight("a", flight.id, None, Some("")).unwrap();
        assert_eq!(unchanged, flight);

        let renamed = service
            .update_flight("a", flight.id, Some("UA 200"), None)
            .unwrap();
        assert_eq!(renamed.name, "UA 200");
        assert_eq!(renamed.time, at(12));

        let moved = service
            .update_flight("a", flight.id, None, Some("2025-01-01T15:00:00Z"))
            .unwrap();
        assert_eq!(moved.name, "UA 200");
        assert_eq!(moved.time, at(15));

        assert!(matches!(
            service.update_flight("b", flight.id, Some("stolen"), None),
            Err(ServiceError::NotFound)
        ));
        assert!(matches!(
            service.update_flight("a", flight.id, None, Some("later")),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_update_does_not_notify() {
        let memory_store = Arc::new(MemoryStore::new());
        memory_store.upsert_user("a", "a@g.ucla.edu", "A").unwrap();
        memory_store.upsert_user("b", "b@g.ucla.edu", "B").unwrap();
        let store = Store::in_memory(Arc::clone(&memory_store));
        let service = FlightService::new(&store);

        service
            .create_flight("b", Some("B1"), Some("2025-01-01T12:00:00Z"))
            .unwrap();
        let flight = service
            .create_flight("a", Some("A1"), Some("2025-01-02T12:00:00Z"))
            .unwrap();

        service
            .update_flight("a", flight.id, None, Some("2025-01-01T12:30:00Z"))
            .unwrap();

        assert!(memory_store.get_notifications_for_user("b").unwrap().is_empty());
    }

    #[test]
    fn test_delete_flight() {
        let store = store_with_users(&["a", "b"]);
        let service = FlightService::new(&store);
        let flight = service
            .create_flight("a", Some("UA 100"), Some("2025-01-01T12:00:00Z"))
            .unwrap();

        assert!(matches!(
            service.delete_flight("b", flight.id),
            Err(ServiceError::NotFound)
        ));
        service.delete_flight("a", flight.id).unwrap();
        assert!(matches!(
            service.get_flight("a", flight.id),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn test_window_queries() {
        let store = store_with_users(&["a", "b"]);
        let service = FlightService::new(&store);

        for (owner, name, time) in [
            ("a", "Flight 1", "2025-05-10T10:00:00Z"),
            ("a", "Flight 2", "2025-05-10T12:00:00Z"),
            ("a", "Flight 3", "2025-05-10T14:00:00Z"),
            ("b", "Next day", "2025-05-11T12:00:00Z"),
        ] {
            service.create_flight(owner, Some(name), Some(time)).unwrap();
        }

        let own = service
            .get_own_flights_near("a", Some("2025-05-10T12:00:00Z"), Some(2.0))
            .unwrap();
        assert_eq!(own.len(), 3);

        let own = service
            .get_own_flights_near("b", Some("2025-05-10T12:00:00Z"), Some(2.0))
            .unwrap();
        assert!(own.is_empty());

        let all = service
            .get_all_flights_near(Some("2025-05-10T12:00:00Z"), Some(3.0))
            .unwrap();
        let names: Vec<&str> = all.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Flight 1", "Flight 2", "Flight 3"]);
        assert_eq!(all[0].owner_email, "a@g.ucla.edu");

        assert!(matches!(
            service.get_all_flights_near(Some("2025-05-10T12:00:00Z"), None),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.get_all_flights_near(None, Some(2.0)),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.get_all_flights_near(Some("2025-05-10T12:00:00Z"), Some(-1.0)),
            Err(ServiceError::Validation(_))
        ));
    }
}
