use when2fly_common::request_io::{
    InputFlight, InputTimeWindow, OutputFlight, OutputFlightWithOwner,
};
use when2fly_common::service::FlightService;
use when2fly_common::store::Store;

use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::handlers::error::{DoesNotExistType, HttpErrorResponse};
use crate::middleware::auth::AuthenticatedUser;

pub async fn create(
    store: web::Data<Store>,
    user: AuthenticatedUser,
    flight_data: web::Json<InputFlight>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let flight_data = flight_data.into_inner();

    let flight = web::block(move || {
        FlightService::new(&store).create_flight(
            &user.claims.user_id,
            flight_data.name.as_deref(),
            flight_data.time.as_deref(),
        )
    })
    .await?
    .map_err(|e| {
        HttpErrorResponse::from_service_error(e, DoesNotExistType::Flight, "Failed to create flight")
    })?;

    Ok(HttpResponse::Created().json(OutputFlight::from(flight)))
}

pub async fn get(
    store: web::Data<Store>,
    user: AuthenticatedUser,
    flight_id: web::Path<Uuid>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let flight_id = flight_id.into_inner();

    let flight = web::block(move || {
        FlightService::new(&store).get_flight(&user.claims.user_id, flight_id)
    })
    .await?
    .map_err(|e| {
        HttpErrorResponse::from_service_error(e, DoesNotExistType::Flight, "Failed to get flight")
    })?;

    Ok(HttpResponse::Ok().json(OutputFlight::from(flight)))
}

pub async fn get_all_owned(
    store: web::Data<Store>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, HttpErrorResponse> {
    let flights = web::block(move || {
        FlightService::new(&store).get_flights_by_owner(&user.claims.user_id)
    })
    .await?
    .map_err(|e| {
        HttpErrorResponse::from_service_error(e, DoesNotExistType::Flight, "Failed to get flights")
    })?;

    Ok(HttpResponse::Ok().json(
        flights
            .into_iter()
            .map(OutputFlight::from)
            .collect::<Vec<_>>(),
    ))
}

pub async fn get_by_user(
    store: web::Data<Store>,
    _user: AuthenticatedUser,
    owner_id: web::Path<String>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let owner_id = owner_id.into_inner();

    let flights = web::block(move || FlightService::new(&store).get_flights_by_owner(&owner_id))
        .await?
        .map_err(|e| {
            HttpErrorResponse::from_service_error(
                e,
                DoesNotExistType::User,
                "Failed to get user's flights",
            )
        })?;

    Ok(HttpResponse::Ok().json(
        flights
            .into_iter()
            .map(OutputFlight::from)
            .collect::<Vec<_>>(),
    ))
}

pub async fn query_time(
    store: web::Data<Store>,
    user: AuthenticatedUser,
    window: web::Query<InputTimeWindow>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let window = window.into_inner();

    let flights = web::block(move || {
        FlightService::new(&store).get_own_flights_near(
            &user.claims.user_id,
            window.time.as_deref(),
            window.interval,
        )
    })
    .await?
    .map_err(|e| {
        HttpErrorResponse::from_service_error(
            e,
            DoesNotExistType::Flight,
            "Failed to query flights by time",
        )
    })?;

    Ok(HttpResponse::Ok().json(
        flights
            .into_iter()
            .map(OutputFlight::from)
            .collect::<Vec<_>>(),
    ))
}

pub async fn all_flights(
    store: web::Data<Store>,
    _user: AuthenticatedUser,
    window: web::Query<InputTimeWindow>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let window = window.into_inner();

    let flights = web::block(move || {
        FlightService::new(&store).get_all_flights_near(window.time.as_deref(), window.interval)
    })
    .await?
    .map_err(|e| {
        HttpErrorResponse::from_service_error(
            e,
            DoesNotExistType::Flight,
            "Failed to query all flights by time",
        )
    })?;

    Ok(HttpResponse::Ok().json(
        flights
            .into_iter()
            .map(OutputFlightWithOwner::from)
            .collect::<Vec<_>>(),
    ))
}

pub async fn edit(
    store: web::Data<Store>,
    user: AuthenticatedUser,
    flight_id: web::Path<Uuid>,
    flight_data: web::Json<InputFlight>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let flight_id = flight_id.into_inner();
    let flight_data = flight_data.into_inner();

    let flight = web::block(move || {
        FlightService::new(&store).update_flight(
            &user.claims.user_id,
            flight_id,
            flight_data.name.as_deref(),
            flight_data.time.as_deref(),
        )
    })
    .await?
    .map_err(|e| {
        HttpErrorResponse::from_service_error(e, DoesNotExistType::Flight, "Failed to edit flight")
    })?;

    Ok(HttpResponse::Ok().json(OutputFlight::from(flight)))
}

pub async fn delete(
    store: web::Data<Store>,
    user: AuthenticatedUser,
    flight_id: web::Path<Uuid>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let flight_id = flight_id.into_inner();

    web::block(move || FlightService::new(&store).delete_flight(&user.claims.user_id, flight_id))
        .await?
        .map_err(|e| {
            HttpErrorResponse::from_service_error(
                e,
                DoesNotExistType::Flight,
                "Failed to delete flight",
            )
        })?;

    Ok(HttpResponse::NoContent().finish())
}
