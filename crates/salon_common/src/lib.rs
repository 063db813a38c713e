// --- File: crates/salon_common/src/lib.rs ---
pub mod error;
pub mod http;
pub mod interval;
pub mod logging;
pub mod models;
pub mod services;

pub use error::{HttpStatusCode, ServiceError};
pub use http::IntoHttpResponse;
pub use interval::{overlaps, overlaps_any, InvalidInterval, TimeInterval};
pub use models::*;
pub use services::{BoxFuture, CalendarProvider, DirectoryStore, Notifier, ReservationStore};
