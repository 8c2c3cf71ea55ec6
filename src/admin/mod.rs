pub mod auth;
pub mod bids;
pub mod model;
pub mod products;
pub mod reports;
pub mod stats;
pub mod users;
