pub mod directory_sql;
pub mod holds_sql;


pub use directory_sql::{SqlDirectoryStore, OPENING_HOURS_KEY};
pub use holds_sql::SqlReservationStore;
