//! SQL reservation ledger.
//!
//! A hold row claims `[start_at, end_at)` (unix seconds) on one calendar until `expires_at`.
//! The overlap check and the insert run in one transaction that starts with a write, so on
//! SQLite concurrent holders are serialized by the database lock; `UNIQUE(calendar_ref,
//! start_at)` additionally rejects identical windows on backends with weaker isolation.

use crate::error::DbError;
use crate::DbClient;
use chrono::Utc;
use salon_common::{BoxFuture, HoldId, ReservationStore, ServiceError, TimeInterval};
use sqlx::Row;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SqlReservationStore {
    db_client: DbClient,
    ttl_seconds: i64,
}

impl SqlReservationStore {
    pub fn new(db_client: DbClient, ttl_seconds: i64) -> Self {
        Self {
            db_client,
            ttl_seconds: ttl_seconds.max(1),
        }
    }

    pub async fn init_schema(&self) -> Result<(), DbError> {
        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS slot_holds (
                id TEXT PRIMARY KEY,
                calendar_ref TEXT NOT NULL,
                start_at INTEGER NOT NULL,
                end_at INTEGER NOT NULL,
                expires_at INTEGER NOT NULL,
                UNIQUE(calendar_ref, start_at)
            )
        "#,
            )
            .await?;
        info!("Reservation schema initialized successfully");
        Ok(())
    }

    pub async fn hold(
        &self,
        calendar_ref: &str,
        interval: &TimeInterval,
    ) -> Result<Option<HoldId>, DbError> {
        let now = Utc::now().timestamp();
        let start = interval.start().timestamp();
        let end = interval.end().timestamp();

        let mut tx = self.db_client.begin().await?;

        sqlx::query("DELETE FROM slot_holds WHERE expires_at <= $1")
            .bind(now)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS n FROM slot_holds
            WHERE calendar_ref = $1 AND start_at < $2 AND end_at > $3
        "#,
        )
        .bind(calendar_ref)
        .bind(end)
        .bind(start)
        .fetch_one(&mut *tx)
        .await?;
        let overlapping: i64 = row.try_get("n")?;
        if overlapping > 0 {
            debug!(calendar_ref, start, end, "Window already held");
            tx.rollback().await?;
            return Ok(None);
        }

        let id = Uuid::new_v4().to_string();
        let inserted = sqlx::query(
            r#"
            INSERT INTO slot_holds (id, calendar_ref, start_at, end_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
        "#,
        )
        .bind(&id)
        .bind(calendar_ref)
        .bind(start)
        .bind(end)
        .bind(now + self.ttl_seconds)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {
                tx.commit()
                    .await
                    .map_err(|e| DbError::TransactionError(e.to_string()))?;
                debug!(calendar_ref, hold = %id, "Hold taken");
                Ok(Some(HoldId(id)))
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                warn!(calendar_ref, start, "Hold lost to a concurrent insert");
                tx.rollback().await?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn unhold(&self, hold: &HoldId) -> Result<(), DbError> {
        sqlx::query("DELETE FROM slot_holds WHERE id = $1")
            .bind(&hold.0)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;
        Ok(())
    }
}

impl ReservationStore for SqlReservationStore {
    fn try_hold(
        &self,
        calendar_ref: &str,
        interval: TimeInterval,
    ) -> BoxFuture<'_, Option<HoldId>, ServiceError> {
        let calendar_ref = calendar_ref.to_string();
        Box::pin(async move { Ok(self.hold(&calendar_ref, &interval).await?) })
    }

    fn release(&self, hold: &HoldId) -> BoxFuture<'_, (), ServiceError> {
        let hold = hold.clone();
        Box::pin(async move { Ok(self.unhold(&hold).await?) })
    }
}
