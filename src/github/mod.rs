pub mod auth;
pub mod client;
pub mod repo;
pub mod types;
