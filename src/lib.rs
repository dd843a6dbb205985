pub mod config;
pub mod database;
pub mod entities;
pub mod error;
pub mod export;
pub mod links;
pub mod registration;
pub mod router;
pub mod routes;
pub mod stats;
pub mod store;
pub mod util;
