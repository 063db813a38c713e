// --- File: crates/salon_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Database Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. "sqlite:data/salon.db", overridable via SALON__DATABASE__URL
    /// Run CREATE TABLE IF NOT EXISTS on startup.
    #[serde(default = "default_true")]
    pub init_schema: bool,
}

// --- Google Calendar Config ---
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GcalConfig {
    /// Path to the service account key file.
    pub key_path: Option<String>,
    /// Site-wide default calendar, used when a request names neither professional nor service.
    pub calendar_id: Option<String>,
}

// --- Mail Config ---
// api_key is usually "secret_from_env" and resolved from MAIL_API_KEY.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub from: String,
    /// Optional copy of every confirmation for the salon owner.
    pub owner_email: Option<String>,
}

/// What to do with a professional whose calendar cannot be read.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BusyFetchFailure {
    /// Exclude the professional from the slot (safe default).
    #[default]
    Busy,
    /// Report the professional as free (legacy behaviour).
    Free,
}

// --- Booking engine Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BookingConfig {
    /// IANA zone every date/time in requests is interpreted in.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    /// Marker put in front of every event title, e.g. "[Salon] Cut - Jane".
    #[serde(default = "default_event_tag")]
    pub event_tag: String,
    /// Name shown for the synthetic professional bound to the default calendar.
    #[serde(default = "default_professional_name")]
    pub default_professional_name: String,
    #[serde(default)]
    pub min_notice_minutes: i64,
    #[serde(default = "default_upstream_timeout_ms")]
    pub upstream_timeout_ms: u64,
    #[serde(default)]
    pub busy_fetch_failure: BusyFetchFailure,
    /// Untagged services fall back to every professional when true.
    #[serde(default = "default_true")]
    pub untagged_service_fallback: bool,
    /// An absent or unreadable opening-hours setting opens every hour when true.
    #[serde(default = "default_true")]
    pub assume_open_when_hours_unknown: bool,
    /// A day the opening-hours text does not open gets 09:00-18:00 when true.
    #[serde(default = "default_true")]
    pub assume_business_hours_for_unlisted_days: bool,
    /// Fixed seed for candidate shuffling; random when absent.
    #[serde(default)]
    pub shuffle_seed: Option<u64>,
    #[serde(default = "default_hold_ttl_seconds")]
    pub hold_ttl_seconds: i64,
    #[serde(default = "default_side_effect_attempts")]
    pub side_effect_attempts: u32,
    #[serde(default = "default_max_duration_minutes")]
    pub max_duration_minutes: i64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
            event_tag: default_event_tag(),
            default_professional_name: default_professional_name(),
            min_notice_minutes: 0,
            upstream_timeout_ms: default_upstream_timeout_ms(),
            busy_fetch_failure: BusyFetchFailure::default(),
            untagged_service_fallback: true,
            assume_open_when_hours_unknown: true,
            assume_business_hours_for_unlisted_days: true,
            shuffle_seed: None,
            hold_ttl_seconds: default_hold_ttl_seconds(),
            side_effect_attempts: default_side_effect_attempts(),
            max_duration_minutes: default_max_duration_minutes(),
        }
    }
}

// --- Business contact details used in confirmations ---
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct BusinessConfig {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Daily rolling log files are written here when set.
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_gcal: bool,
    #[serde(default)]
    pub use_database: bool,
    #[serde(default)]
    pub use_mail: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub gcal: Option<GcalConfig>,
    #[serde(default)]
    pub mail: Option<MailConfig>,

    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub business: BusinessConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_true() -> bool {
    true
}

fn default_time_zone() -> String {
    "Europe/Zurich".to_string()
}

fn default_event_tag() -> String {
    "Salon".to_string()
}

fn default_professional_name() -> String {
    "Salon".to_string()
}

fn default_upstream_timeout_ms() -> u64 {
    5_000
}

fn default_hold_ttl_seconds() -> i64 {
    120
}

fn default_side_effect_attempts() -> u32 {
    3
}

fn default_max_duration_minutes() -> i64 {
    13 * 60
}

fn default_log_level() -> String {
    "info".to_string()
}
