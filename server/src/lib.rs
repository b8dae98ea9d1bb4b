pub mod config;
pub mod engine;
pub mod gateways;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;
