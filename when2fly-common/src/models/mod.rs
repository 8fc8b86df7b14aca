pub mod flight;
pub mod job_registry_item;
pub mod notification;
pub mod user;
