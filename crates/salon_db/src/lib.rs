//! SQL persistence for the salon backend.
//!
//! [`SqlDirectoryStore`] backs the `DirectoryStore` collaborator (professionals, the
//! opening-hours setting, customer contacts) and [`SqlReservationStore`] the reservation
//! ledger that keeps two bookings from claiming the same window. Both run on a
//! database-agnostic `sqlx::Any` pool; SQLite is the default backend.

pub mod client;
pub mod error;
pub mod repositories;

pub use client::DbClient;
pub use error::DbError;
pub use repositories::{SqlDirectoryStore, SqlReservationStore, OPENING_HOURS_KEY};

/// Connects and, when `init_schema` is set, creates all tables.
pub async fn connect(
    config: &salon_config::DatabaseConfig,
    hold_ttl_seconds: i64,
) -> Result<(SqlDirectoryStore, SqlReservationStore), DbError> {
    let client = DbClient::from_config(config).await?;
    let directory = SqlDirectoryStore::new(client.clone());
    let holds = SqlReservationStore::new(client, hold_ttl_seconds);
    if config.init_schema {
        directory.init_schema().await?;
        holds.init_schema().await?;
    }
    Ok((directory, holds))
}
