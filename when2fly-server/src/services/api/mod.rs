use actix_web::web::*;

mod flight;
mod health;
mod notification;
mod user;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.configure(flight::configure)
        .configure(notification::configure)
        .configure(user::configure)
        .configure(health::configure);
}
