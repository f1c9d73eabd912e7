/// Raw webhook event model
///
/// The bot appends every webhook body here before parsing it, so broken or
/// unexpected payloads can be inspected after the fact. The dashboard only
/// lists the most recent lines.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE raw_events (
///     id BIGSERIAL PRIMARY KEY,
///     payload TEXT NOT NULL,
///     received_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// One unparsed webhook line
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RawEvent {
    /// Row id
    pub id: i64,

    /// Webhook body exactly as received
    pub payload: String,

    /// When the webhook arrived
    pub received_at: DateTime<Utc>,
}

impl RawEvent {
    /// The `limit` most recent raw events, newest first
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, RawEvent>(
            r#"
            SELECT id, payload, received_at
            FROM raw_events
            ORDER BY received_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
