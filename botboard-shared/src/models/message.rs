/// Message model and the peak-hours report
///
/// One row per WhatsApp message, both directions. `wa_status` is the
/// delivery state WhatsApp last reported for an outgoing message (sent,
/// delivered, read, failed); it stays NULL for incoming traffic.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE message_direction AS ENUM ('incoming', 'outgoing');
///
/// CREATE TABLE messages (
///     id BIGSERIAL PRIMARY KEY,
///     conversation_id BIGINT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     direction message_direction NOT NULL,
///     message_type TEXT,
///     content TEXT,
///     wa_status TEXT,
///     timestamp TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::filters::DateRange;

/// Message direction relative to the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "message_direction", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageDirection {
    /// From the user to the bot
    Incoming,

    /// From the bot to the user
    Outgoing,
}

impl MessageDirection {
    /// The wire/CSV representation, matching the database enum labels
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageDirection::Incoming => "incoming",
            MessageDirection::Outgoing => "outgoing",
        }
    }
}

/// One WhatsApp message
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    /// Row id
    pub id: i64,

    /// Owning conversation
    pub conversation_id: i64,

    /// Owning user
    pub user_id: i64,

    /// Direction relative to the bot
    pub direction: MessageDirection,

    /// WhatsApp message type (text, interactive, image, ...)
    pub message_type: Option<String>,

    /// Message body; media messages may have none
    pub content: Option<String>,

    /// Last delivery status WhatsApp reported (outgoing only)
    pub wa_status: Option<String>,

    /// When the message was sent or received
    pub timestamp: DateTime<Utc>,

    /// When the row was inserted
    pub created_at: DateTime<Utc>,
}

/// Message volume for one hour of the day (0-23)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct HourlyMessages {
    pub hour: i32,
    pub total_messages: i64,
    pub incoming: i64,
    pub outgoing: i64,
    pub unique_users: i64,
}

/// Message volume for one day of the week (0=Sunday .. 6=Saturday)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DayOfWeekMessages {
    pub day_of_week: i32,
    pub day_name: String,
    pub total_messages: i64,
    pub unique_users: i64,
}

/// Message volume for one calendar day
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DailyMessages {
    pub date: NaiveDate,
    pub total_messages: i64,
    pub incoming: i64,
    pub outgoing: i64,
    pub unique_users: i64,
}

/// Overall message totals for the selected range
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MessageTotals {
    pub total_messages: i64,
    pub total_incoming: i64,
    pub total_outgoing: i64,
    pub unique_users: i64,
    pub unique_conversations: i64,
}

/// Export row joining in the owner's phone hash
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MessageExportRow {
    pub id: i64,
    pub conversation_id: i64,
    pub user_id: i64,
    pub phone_hash: Option<String>,
    pub direction: MessageDirection,
    pub message_type: Option<String>,
    pub content: Option<String>,
    pub wa_status: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// All messages of one conversation, oldest first
    pub async fn list_by_conversation(
        pool: &PgPool,
        conversation_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Message>(
            r#"
            SELECT id, conversation_id, user_id, direction, message_type,
                   content, wa_status, timestamp, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY timestamp ASC
            "#,
        )
        .bind(conversation_id)
        .fetch_all(pool)
        .await
    }

    /// Message volume per hour of day over the range
    pub async fn by_hour(
        pool: &PgPool,
        range: &DateRange,
    ) -> Result<Vec<HourlyMessages>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT EXTRACT(HOUR FROM timestamp)::INTEGER AS hour, \
                    COUNT(*) AS total_messages, \
                    COUNT(*) FILTER (WHERE direction = 'incoming') AS incoming, \
                    COUNT(*) FILTER (WHERE direction = 'outgoing') AS outgoing, \
                    COUNT(DISTINCT user_id) AS unique_users \
             FROM messages WHERE 1=1",
        );
        range.apply(&mut builder, "timestamp");
        builder.push(" GROUP BY EXTRACT(HOUR FROM timestamp) ORDER BY hour ASC");

        builder
            .build_query_as::<HourlyMessages>()
            .fetch_all(pool)
            .await
    }

    /// Message volume per day of week over the range
    pub async fn by_day_of_week(
        pool: &PgPool,
        range: &DateRange,
    ) -> Result<Vec<DayOfWeekMessages>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT EXTRACT(DOW FROM timestamp)::INTEGER AS day_of_week, \
                    TRIM(TO_CHAR(timestamp, 'Day')) AS day_name, \
                    COUNT(*) AS total_messages, \
                    COUNT(DISTINCT user_id) AS unique_users \
             FROM messages WHERE 1=1",
        );
        range.apply(&mut builder, "timestamp");
        builder.push(
            " GROUP BY EXTRACT(DOW FROM timestamp), TRIM(TO_CHAR(timestamp, 'Day')) \
             ORDER BY day_of_week ASC",
        );

        builder
            .build_query_as::<DayOfWeekMessages>()
            .fetch_all(pool)
            .await
    }

    /// Daily message volume over the trailing 30 days, further narrowed by
    /// the range when one is set
    pub async fn by_day_last_30(
        pool: &PgPool,
        range: &DateRange,
    ) -> Result<Vec<DailyMessages>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT DATE(timestamp) AS date, \
                    COUNT(*) AS total_messages, \
                    COUNT(*) FILTER (WHERE direction = 'incoming') AS incoming, \
                    COUNT(*) FILTER (WHERE direction = 'outgoing') AS outgoing, \
                    COUNT(DISTINCT user_id) AS unique_users \
             FROM messages \
             WHERE timestamp >= NOW() - INTERVAL '30 days'",
        );
        range.apply(&mut builder, "timestamp");
        builder.push(" GROUP BY DATE(timestamp) ORDER BY date ASC");

        builder
            .build_query_as::<DailyMessages>()
            .fetch_all(pool)
            .await
    }

    /// Overall totals for the range
    pub async fn totals(pool: &PgPool, range: &DateRange) -> Result<MessageTotals, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) AS total_messages, \
                    COUNT(*) FILTER (WHERE direction = 'incoming') AS total_incoming, \
                    COUNT(*) FILTER (WHERE direction = 'outgoing') AS total_outgoing, \
                    COUNT(DISTINCT user_id) AS unique_users, \
                    COUNT(DISTINCT conversation_id) AS unique_conversations \
             FROM messages WHERE 1=1",
        );
        range.apply(&mut builder, "timestamp");

        builder
            .build_query_as::<MessageTotals>()
            .fetch_one(pool)
            .await
    }

    /// Rows for the CSV export, newest first, capped at `limit`
    pub async fn export_rows(
        pool: &PgPool,
        range: &DateRange,
        limit: i64,
    ) -> Result<Vec<MessageExportRow>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT m.id, m.conversation_id, m.user_id, u.phone_hash, m.direction, \
                    m.message_type, m.content, m.wa_status, m.timestamp \
             FROM messages m \
             LEFT JOIN users u ON m.user_id = u.id \
             WHERE 1=1",
        );
        range.apply(&mut builder, "m.created_at");
        builder.push(" ORDER BY m.timestamp DESC LIMIT ");
        builder.push_bind(limit);

        builder
            .build_query_as::<MessageExportRow>()
            .fetch_all(pool)
            .await
    }
}

/// Picks the hour with the most messages, as shown on the dashboard's
/// "peak hour" card. Ties resolve to the earlier hour; an empty day has no
/// peak.
pub fn peak_hour(rows: &[HourlyMessages]) -> Option<HourlyMessages> {
    rows.iter()
        .max_by_key(|row| (row.total_messages, -(row.hour as i64)))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hour(hour: i32, total_messages: i64) -> HourlyMessages {
        HourlyMessages {
            hour,
            total_messages,
            incoming: 0,
            outgoing: 0,
            unique_users: 0,
        }
    }

    #[test]
    fn test_peak_hour_empty() {
        assert!(peak_hour(&[]).is_none());
    }

    #[test]
    fn test_peak_hour_picks_maximum() {
        let rows = vec![hour(9, 12), hour(15, 48), hour(20, 31)];
        let peak = peak_hour(&rows).unwrap();
        assert_eq!(peak.hour, 15);
        assert_eq!(peak.total_messages, 48);
    }

    #[test]
    fn test_peak_hour_tie_prefers_earlier_hour() {
        let rows = vec![hour(10, 30), hour(18, 30)];
        assert_eq!(peak_hour(&rows).unwrap().hour, 10);
    }

    #[test]
    fn test_direction_serializes_lowercase() {
        let json = serde_json::to_string(&MessageDirection::Incoming).unwrap();
        assert_eq!(json, "\"incoming\"");
    }
}
