pub mod auth;
pub mod cors;

pub use cors::CorsMiddleware;
