/// Persistence layer for monitored services.
///
/// The monitoring engine only sees the narrow `ServiceRepository` trait;
/// the libsql implementation and schema management live behind it.
pub mod migrations;
pub mod models;
pub mod repository;

pub use repository::{LibsqlServiceRepository, ServiceRepository};

use anyhow::Result;

/// Initialize database with schema
pub async fn initialize_database(conn: &libsql::Connection) -> Result<()> {
    migrations::run_migrations(conn).await
}
