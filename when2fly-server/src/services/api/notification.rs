use actix_web::web::*;

use crate::handlers::notification;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/notifications")
            .service(resource("").route(get().to(notification::get)))
            .service(
                resource("/read/{notification_id}").route(post().to(notification::toggle_read)),
            ),
    );
}
