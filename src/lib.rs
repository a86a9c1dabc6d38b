pub mod auth;
pub mod boundary;
pub mod config;
pub mod errors;
pub mod form;
pub mod handlers;
pub mod schema;
pub mod state;
pub mod templates_structs;
