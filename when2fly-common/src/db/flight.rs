use chrono::{DateTime, Utc};
use diesel::{dsl, ExpressionMethods, QueryDsl, RunQueryDsl};
use uuid::Uuid;

use crate::db::{DaoError, DbThreadPool};
use crate::models::flight::{Flight, FlightPatch, FlightWithOwner, NewFlight};
use crate::schema::flights as flight_fields;
use crate::schema::flights::dsl::flights;
use crate::schema::users as user_fields;
use crate::schema::users::dsl::users;
use crate::store::FlightRepository;
use crate::time_window::TimeWindow;

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

impl FlightRepository for Dao {
    fn create_flight(
        &self,
        owner_id: &str,
        name: &str,
        time: DateTime<Utc>,
    ) -> Result<Flight, DaoError> {
        let new_flight = NewFlight {
            id: Uuid::now_v7(),
            user_id: owner_id,
            name,
            time,
            created_timestamp: Utc::now(),
        };

        Ok(dsl::insert_into(flights)
            .values(&new_flight)
            .get_result::<Flight>(&mut self.db_thread_pool.get()?)?)
    }

    fn get_flight(&self, flight_id: Uuid, owner_id: &str) -> Result<Flight, DaoError> {
        Ok(flights
            .find(flight_id)
            .filter(flight_fields::user_id.eq(owner_id))
            .first::<Flight>(&mut self.db_thread_pool.get()?)?)
    }

    fn get_flights_by_owner(&self, owner_id: &str) -> Result<Vec<Flight>, DaoError> {
        Ok(flights
            .filter(flight_fields::user_id.eq(owner_id))
            .order((flight_fields::time.asc(), flight_fields::id.asc()))
            .load::<Flight>(&mut self.db_thread_pool.get()?)?)
    }

    fn get_owner_flights_in_window(
        &self,
        owner_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<Flight>, DaoError> {
        Ok(flights
            .filter(flight_fields::user_id.eq(owner_id))
            .filter(flight_fields::time.between(window.start, window.end))
            .order((flight_fields::time.asc(), flight_fields::id.asc()))
            .load::<Flight>(&mut self.db_thread_pool.get()?)?)
    }

    fn get_flights_in_window(
        &self,
        window: &TimeWindow,
        excluded_owner_id: Option<&str>,
    ) -> Result<Vec<FlightWithOwner>, DaoError> {
        let mut query = flights
            .inner_join(users)
            .select((
                flight_fields::id,
                flight_fields::user_id,
                flight_fields::name,
                flight_fields::time,
                user_fields::name,
                user_fields::email,
            ))
            .filter(flight_fields::time.between(window.start, window.end))
            .order((flight_fields::time.asc(), flight_fields::id.asc()))
            .into_boxed();

        if let Some(owner_id) = excluded_owner_id {
            query = query.filter(flight_fields::user_id.ne(owner_id));
        }

        Ok(query.load::<FlightWithOwner>(&mut self.db_thread_pool.get()?)?)
    }

    fn update_flight(
        &self,
        flight_id: Uuid,
        owner_id: &str,
        patch: &FlightPatch,
    ) -> Result<Flight, DaoError> {
        // Diesel refuses to build an UPDATE with nothing to set
        if patch.is_empty() {
            return self.get_flight(flight_id, owner_id);
        }

        Ok(dsl::update(
            flights
                .find(flight_id)
                .filter(flight_fields::user_id.eq(owner_id)),
        )
        .set(patch)
        .get_result::<Flight>(&mut self.db_thread_pool.get()?)?)
    }

    fn delete_flight(&self, flight_id: Uuid, owner_id: &str) -> Result<(), DaoError> {
        let deleted_count = diesel::delete(
            flights
                .find(flight_id)
                .filter(flight_fields::user_id.eq(owner_id)),
        )
        .execute(&mut self.db_thread_pool.get()?)?;

        if deleted_count == 0 {
            return Err(DaoError::not_found());
        }

        Ok(())
    }
}
