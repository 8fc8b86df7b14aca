#![cfg(not(doctest))]

#[macro_use]
extern crate diesel;

pub mod db;
pub mod models;
pub mod proximity;
pub mod request_io;
pub mod schema;
pub mod service;
pub mod store;
pub mod time_window;
pub mod token;
pub mod validators;
