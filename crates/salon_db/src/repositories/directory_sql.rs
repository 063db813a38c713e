//! SQL implementation of the salon directory: professionals, settings and customers.

use crate::error::DbError;
use crate::DbClient;
use salon_common::{
    BoxFuture, ContactRecord, ContactUpsert, DirectoryStore, HoursSetting, Professional,
    ServiceError,
};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};

/// Settings key holding the free-text weekly opening hours.
pub const OPENING_HOURS_KEY: &str = "opening_hours";

#[derive(Debug, Clone)]
pub struct SqlDirectoryStore {
    db_client: DbClient,
}

impl SqlDirectoryStore {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    pub async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing directory schema");

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS professionals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                calendar_ref TEXT NOT NULL,
                services TEXT NOT NULL DEFAULT ''
            )
        "#,
            )
            .await?;

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
        "#,
            )
            .await?;

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS customers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT,
                phone TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
        "#,
            )
            .await?;

        info!("Directory schema initialized successfully");
        Ok(())
    }

    /// Inserts or replaces a professional by name. Services are stored comma separated.
    pub async fn save_professional(&self, professional: &Professional) -> Result<(), DbError> {
        let services = professional
            .services
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(",");

        sqlx::query(
            r#"
            INSERT INTO professionals (name, calendar_ref, services)
            VALUES ($1, $2, $3)
            ON CONFLICT(name) DO UPDATE SET calendar_ref = excluded.calendar_ref,
                                            services = excluded.services
        "#,
        )
        .bind(professional.name.trim())
        .bind(&professional.calendar_ref)
        .bind(services)
        .execute(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to save professional: {}", e);
            DbError::QueryError(e.to_string())
        })?;
        Ok(())
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value) VALUES ($1, $2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
        )
        .bind(key)
        .bind(value)
        .execute(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?;
        Ok(())
    }

    pub async fn get_setting(&self, key: &str) -> Result<Option<String>, DbError> {
        let row = sqlx::query("SELECT value FROM settings WHERE key = $1")
            .bind(key)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;
        Ok(row.and_then(|r| r.try_get::<String, _>("value").ok()))
    }

    pub async fn professionals(&self) -> Result<Vec<Professional>, DbError> {
        let rows = sqlx::query("SELECT name, calendar_ref, services FROM professionals ORDER BY id")
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to list professionals: {}", e);
                DbError::QueryError(e.to_string())
            })?;
        Ok(rows.iter().map(professional_from_row).collect())
    }

    pub async fn professional_by_name(&self, name: &str) -> Result<Option<Professional>, DbError> {
        let row = sqlx::query("SELECT name, calendar_ref, services FROM professionals WHERE name = $1")
            .bind(name.trim())
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;
        Ok(row.as_ref().map(professional_from_row))
    }

    /// Keyed by email when present, otherwise by phone. A match only gets its name refreshed.
    pub async fn save_contact(&self, contact: &ContactRecord) -> Result<ContactUpsert, DbError> {
        let email = non_blank(contact.email.as_deref());
        let phone = non_blank(contact.phone.as_deref());

        let existing = match (email, phone) {
            (Some(email), _) => {
                sqlx::query("SELECT id FROM customers WHERE email = $1")
                    .bind(email)
                    .fetch_optional(self.db_client.pool())
                    .await
            }
            (None, Some(phone)) => {
                sqlx::query("SELECT id FROM customers WHERE phone = $1")
                    .bind(phone)
                    .fetch_optional(self.db_client.pool())
                    .await
            }
            (None, None) => {
                return Err(DbError::QueryError(
                    "contact has neither email nor phone".to_string(),
                ))
            }
        }
        .map_err(|e| DbError::QueryError(e.to_string()))?;

        if let Some(row) = existing {
            let id: i64 = row.try_get("id")?;
            debug!(customer_id = id, "Updating existing customer");
            sqlx::query("UPDATE customers SET name = $1 WHERE id = $2")
                .bind(contact.name.trim())
                .bind(id)
                .execute(self.db_client.pool())
                .await
                .map_err(|e| DbError::QueryError(e.to_string()))?;
            return Ok(ContactUpsert { id, created: false });
        }

        let row = sqlx::query(
            r#"
            INSERT INTO customers (name, email, phone)
            VALUES ($1, $2, $3)
            RETURNING id
        "#,
        )
        .bind(contact.name.trim())
        .bind(email)
        .bind(phone)
        .fetch_one(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to insert customer: {}", e);
            DbError::QueryError(e.to_string())
        })?;
        let id: i64 = row.try_get("id")?;
        info!(customer_id = id, "Customer created");
        Ok(ContactUpsert { id, created: true })
    }
}

fn professional_from_row(row: &AnyRow) -> Professional {
    let services: String = row.try_get("services").unwrap_or_default();
    Professional::new(
        row.try_get::<String, _>("name").unwrap_or_default(),
        row.try_get::<String, _>("calendar_ref").unwrap_or_default(),
    )
    .with_services(
        services
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    )
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl DirectoryStore for SqlDirectoryStore {
    fn list_professionals(&self) -> BoxFuture<'_, Vec<Professional>, ServiceError> {
        Box::pin(async move { Ok(self.professionals().await?) })
    }

    fn find_professional(&self, name: &str) -> BoxFuture<'_, Option<Professional>, ServiceError> {
        let name = name.to_string();
        Box::pin(async move { Ok(self.professional_by_name(&name).await?) })
    }

    fn opening_hours(&self) -> BoxFuture<'_, HoursSetting, ServiceError> {
        Box::pin(async move {
            let value = self.get_setting(OPENING_HOURS_KEY).await?;
            Ok(match value {
                Some(text) if !text.trim().is_empty() => HoursSetting::Present(text),
                _ => HoursSetting::Absent,
            })
        })
    }

    fn upsert_contact(&self, contact: ContactRecord) -> BoxFuture<'_, ContactUpsert, ServiceError> {
        Box::pin(async move { Ok(self.save_contact(&contact).await?) })
    }
}
