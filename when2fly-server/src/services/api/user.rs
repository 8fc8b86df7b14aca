use actix_web::web::*;

use crate::handlers::user;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/users")
            .service(
                resource("")
                    .route(post().to(user::register))
                    .route(get().to(user::get)),
            )
            .service(resource("/update-name").route(put().to(user::edit_name)))
            .service(resource("/update-timezone").route(put().to(user::edit_timezone))),
    );
}
