pub mod analysis;
pub mod config;
pub mod database;
pub mod handlers;
pub mod integrations;
pub mod jobs;

pub use database::Database;
