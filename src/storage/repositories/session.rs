//! Session repository
//!
//! Rows of the `session` table: id, JSON payload, expiry.

use crate::auth::session::{SessionData, SessionRecord};
use crate::errors::{DealershipError, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use tracing::instrument;

#[derive(Debug, Clone, FromRow)]
struct SessionRow {
    pub sid: String,
    pub sess: Json<SessionData>,
    pub expire: DateTime<Utc>,
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Fetch a session record by id, expired or not
    async fn load(&self, id: &str) -> Result<Option<SessionRecord>>;

    /// Insert or replace a session record
    async fn save(&self, record: &SessionRecord) -> Result<()>;

    /// Remove a session record; missing ids are ignored
    async fn destroy(&self, id: &str) -> Result<()>;

    /// Remove every record that expired before `now`
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64>;
}

#[derive(Debug, Clone)]
pub struct SqlxSessionRepository {
    pool: DbPool,
}

impl SqlxSessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    #[instrument(skip(self, id), name = "db_load_session")]
    async fn load(&self, id: &str) -> Result<Option<SessionRecord>> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT sid, sess, expire FROM session WHERE sid = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| DealershipError::database(err, "Failed to load session"))?;

        Ok(row.map(|row| SessionRecord { id: row.sid, data: row.sess.0, expires_at: row.expire }))
    }

    #[instrument(skip(self, record), name = "db_save_session")]
    async fn save(&self, record: &SessionRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO session (sid, sess, expire)
            VALUES ($1, $2, $3)
            ON CONFLICT (sid) DO UPDATE SET sess = EXCLUDED.sess, expire = EXCLUDED.expire
            "#,
        )
        .bind(&record.id)
        .bind(Json(&record.data))
        .bind(record.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|err| DealershipError::database(err, "Failed to save session"))?;

        Ok(())
    }

    #[instrument(skip(self, id), name = "db_destroy_session")]
    async fn destroy(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM session WHERE sid = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| DealershipError::database(err, "Failed to destroy session"))?;

        Ok(())
    }

    #[instrument(skip(self), name = "db_delete_expired_sessions")]
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM session WHERE expire < $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|err| DealershipError::database(err, "Failed to delete expired sessions"))?;

        Ok(result.rows_affected())
    }
}
