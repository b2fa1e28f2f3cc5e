pub mod auth;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod forms;
pub mod handlers;
pub mod ids;
pub mod middleware;
pub mod models;
pub mod researchers;
pub mod store;
pub mod uploads;
