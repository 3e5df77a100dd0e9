/// Article Service Library
///
/// CRUD over articles and accounts, with reads accelerated by a Redis cache
/// kept in step with PostgreSQL through the `entity-cache` synchronizers.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `models`: Articles, accounts and request/response shapes
/// - `services`: Store and cache call ordering per operation
/// - `db`: Store traits and PostgreSQL repositories
/// - `security`: Password hashing and access tokens
/// - `middleware`: Bearer token extraction
/// - `error`: Error types and HTTP mapping
/// - `config`: Configuration management
/// - `metrics`: Prometheus endpoint
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod security;
pub mod services;

pub use config::Config;
pub use error::{AppError, ErrorKind, Result};
