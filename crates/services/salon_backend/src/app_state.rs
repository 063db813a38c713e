// --- File: crates/services/salon_backend/src/app_state.rs ---
//! Builds the booking context from `AppConfig`.

use salon_booking::{BookingContext, BookingError, BookingSettings, BookingState};
use salon_common::{CalendarProvider, Notifier};
use salon_config::AppConfig;
use salon_gcal::{create_calendar_hub, GoogleCalendarProvider};
use salon_mail::HttpMailNotifier;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("booking settings: {0}")]
    Settings(#[from] BookingError),

    #[error("database: {0}")]
    Database(#[from] salon_db::DbError),

    #[error("a directory store is required; set use_database = true and configure [database]")]
    NoDirectory,
}

/// Wires the collaborators enabled in `config`.
///
/// The database is mandatory (it holds the professionals and the reservation ledger). A
/// calendar or mail integration that fails to initialise is logged and left out, so the
/// server still starts and reports the degraded state on `/health`.
pub async fn build_state(config: &AppConfig) -> Result<Arc<BookingState>, StartupError> {
    let settings = BookingSettings::from_config(config)?;

    let database = match (config.use_database, config.database.as_ref()) {
        (true, Some(database)) => database,
        _ => return Err(StartupError::NoDirectory),
    };
    let (directory, reservations) =
        salon_db::connect(database, config.booking.hold_ttl_seconds).await?;
    info!("Database connected");

    let calendar: Option<Arc<dyn CalendarProvider>> = match (config.use_gcal, config.gcal.as_ref()) {
        (true, Some(gcal)) => match create_calendar_hub(gcal).await {
            Ok(hub) => {
                info!("Google Calendar provider initialised");
                Some(Arc::new(GoogleCalendarProvider::new(Arc::new(hub))))
            }
            Err(e) => {
                warn!(error = %e, "Google Calendar unavailable, booking disabled");
                None
            }
        },
        (true, None) => {
            warn!("use_gcal is set but [gcal] is missing");
            None
        }
        _ => None,
    };

    let notifier: Option<Arc<dyn Notifier>> = match (config.use_mail, config.mail.as_ref()) {
        (true, Some(mail)) => match HttpMailNotifier::new(mail) {
            Ok(notifier) => Some(Arc::new(notifier)),
            Err(e) => {
                warn!(error = %e, "Mail notifier unavailable, confirmations disabled");
                None
            }
        },
        _ => None,
    };

    let context = Arc::new(BookingContext {
        settings,
        calendar,
        directory: Arc::new(directory),
        reservations: Arc::new(reservations),
        notifier,
    });
    Ok(Arc::new(BookingState::new(context)))
}
