pub mod admin;
pub mod config;
pub mod database;
pub mod date;
pub mod error;
pub mod handlers;
pub mod query;
pub mod retry;
pub mod store;
