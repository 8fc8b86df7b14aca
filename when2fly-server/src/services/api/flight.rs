use actix_web::web::*;

use crate::handlers::flight;

pub fn configure(cfg: &mut ServiceConfig) {
    // Static segments are registered ahead of `/{flight_id}`
    cfg.service(
        scope("/flights")
            .service(
                resource("")
                    .route(post().to(flight::create))
                    .route(get().to(flight::get_all_owned)),
            )
            .service(resource("/queryTime").route(get().to(flight::query_time)))
            .service(resource("/allFlights").route(get().to(flight::all_flights)))
            .service(resource("/user/{user_id}").route(get().to(flight::get_by_user)))
            .service(
                resource("/{flight_id}")
                    .route(get().to(flight::get))
                    .route(put().to(flight::edit))
                    .route(delete().to(flight::delete)),
            ),
    );
}
