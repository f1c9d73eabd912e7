/// Conversation model and the conversation summary report
///
/// A conversation is one bot session: it starts when a user messages the bot
/// after a quiet period and ends when the flow completes or the user goes
/// silent. The bot stamps `status`, `intent`, `outcome` and
/// `duration_seconds` when it closes the session.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE conversation_status AS ENUM ('active', 'completed', 'abandoned');
///
/// CREATE TABLE conversations (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     started_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     ended_at TIMESTAMPTZ,
///     status conversation_status NOT NULL DEFAULT 'active',
///     intent TEXT,
///     outcome TEXT,
///     total_messages INTEGER NOT NULL DEFAULT 0,
///     duration_seconds INTEGER,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::filters::DateRange;

/// Outcome string the bot writes when a session ends in a confirmed booking
pub const OUTCOME_BOOKING_CONFIRMED: &str = "booking_confirmed";

/// Conversation lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "conversation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    /// Session is still open
    Active,

    /// Flow ran to completion
    Completed,

    /// User went silent before finishing
    Abandoned,
}

impl ConversationStatus {
    /// The wire/CSV representation, matching the database enum labels
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationStatus::Active => "active",
            ConversationStatus::Completed => "completed",
            ConversationStatus::Abandoned => "abandoned",
        }
    }
}

/// One bot session
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conversation {
    /// Row id
    pub id: i64,

    /// Owning user
    pub user_id: i64,

    /// Session start
    pub started_at: DateTime<Utc>,

    /// Session end (None while active)
    pub ended_at: Option<DateTime<Utc>>,

    /// Lifecycle state
    pub status: ConversationStatus,

    /// Detected intent (None when the bot never classified the session)
    pub intent: Option<String>,

    /// Final outcome (None while active or when nothing happened)
    pub outcome: Option<String>,

    /// Message count, maintained by the bot
    pub total_messages: i32,

    /// Wall-clock session length, stamped at close
    pub duration_seconds: Option<i32>,

    /// When the row was inserted
    pub created_at: DateTime<Utc>,
}

/// Conversation counts by lifecycle state
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusCounts {
    pub active: i64,
    pub completed: i64,
    pub abandoned: i64,
}

impl StatusCounts {
    /// Sum over all states
    pub fn total(&self) -> i64 {
        self.active + self.completed + self.abandoned
    }
}

/// Duration aggregates over closed conversations
#[derive(Debug, Clone, Copy, Serialize, sqlx::FromRow)]
pub struct DurationStats {
    pub avg_seconds: i64,
    pub min_seconds: i64,
    pub max_seconds: i64,
}

/// Conversations per detected intent
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct IntentCount {
    /// Intent string, `"unknown"` for unclassified sessions
    pub intent: String,
    pub total: i64,
}

/// Conversations per final outcome
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OutcomeCount {
    /// Outcome string, `"unknown"` for sessions without one
    pub outcome: String,
    pub total: i64,
}

/// One day of the rolling 30-day series
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DailyConversations {
    pub date: NaiveDate,
    pub total: i64,
    pub completed: i64,
    pub abandoned: i64,
    pub active: i64,
}

/// Aggregates for `GET /api/conversations/summary`
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSummary {
    pub by_status: StatusCounts,

    /// Sum over `by_status`
    pub total: i64,

    pub duration: DurationStats,
    pub by_intent: Vec<IntentCount>,
    pub by_outcome: Vec<OutcomeCount>,

    /// Always the trailing 30 days, regardless of the `from`/`to` filter:
    /// the dashboard shows this chart as "last 30 days" next to the
    /// filtered aggregates
    pub daily_last_30_days: Vec<DailyConversations>,
}

/// Export row joining in the owner's phone hash
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ConversationExportRow {
    pub id: i64,
    pub user_id: i64,
    pub phone_hash: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub status: ConversationStatus,
    pub intent: Option<String>,
    pub outcome: Option<String>,
    pub total_messages: i32,
    pub duration_seconds: Option<i32>,
}

impl Conversation {
    /// A page of one user's conversations, newest first
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, user_id, started_at, ended_at, status, intent, outcome,
                   total_messages, duration_seconds, created_at
            FROM conversations
            WHERE user_id = $1
            ORDER BY started_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Total conversations for one user, for pagination
    pub async fn count_by_user(pool: &PgPool, user_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM conversations WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Rows for the CSV export, newest sessions first, capped at `limit`
    pub async fn export_rows(
        pool: &PgPool,
        range: &DateRange,
        limit: i64,
    ) -> Result<Vec<ConversationExportRow>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT c.id, c.user_id, u.phone_hash, c.started_at, c.ended_at, \
                    c.status, c.intent, c.outcome, c.total_messages, c.duration_seconds \
             FROM conversations c \
             LEFT JOIN users u ON c.user_id = u.id \
             WHERE 1=1",
        );
        range.apply(&mut builder, "c.created_at");
        builder.push(" ORDER BY c.started_at DESC LIMIT ");
        builder.push_bind(limit);

        builder
            .build_query_as::<ConversationExportRow>()
            .fetch_all(pool)
            .await
    }
}

impl ConversationSummary {
    /// Runs the aggregate queries behind the conversation summary report
    pub async fn load(pool: &PgPool, range: &DateRange) -> Result<Self, sqlx::Error> {
        // Counts per lifecycle state
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT status, COUNT(*) FROM conversations WHERE 1=1",
        );
        range.apply(&mut builder, "started_at");
        builder.push(" GROUP BY status");
        let status_rows: Vec<(ConversationStatus, i64)> =
            builder.build_query_as().fetch_all(pool).await?;

        let mut by_status = StatusCounts::default();
        for (status, count) in status_rows {
            match status {
                ConversationStatus::Active => by_status.active = count,
                ConversationStatus::Completed => by_status.completed = count,
                ConversationStatus::Abandoned => by_status.abandoned = count,
            }
        }

        // Duration spread over closed sessions
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT COALESCE(ROUND(AVG(duration_seconds)), 0)::BIGINT AS avg_seconds, \
                    COALESCE(MIN(duration_seconds), 0)::BIGINT AS min_seconds, \
                    COALESCE(MAX(duration_seconds), 0)::BIGINT AS max_seconds \
             FROM conversations WHERE duration_seconds IS NOT NULL",
        );
        range.apply(&mut builder, "started_at");
        let duration: DurationStats = builder
            .build_query_as::<DurationStats>()
            .fetch_one(pool)
            .await?;

        // Counts per intent, busiest first
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT COALESCE(intent, 'unknown') AS intent, COUNT(*) AS total \
             FROM conversations WHERE 1=1",
        );
        range.apply(&mut builder, "started_at");
        builder.push(" GROUP BY intent ORDER BY total DESC");
        let by_intent = builder
            .build_query_as::<IntentCount>()
            .fetch_all(pool)
            .await?;

        // Counts per outcome, busiest first
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT COALESCE(outcome, 'unknown') AS outcome, COUNT(*) AS total \
             FROM conversations WHERE 1=1",
        );
        range.apply(&mut builder, "started_at");
        builder.push(" GROUP BY outcome ORDER BY total DESC");
        let by_outcome = builder
            .build_query_as::<OutcomeCount>()
            .fetch_all(pool)
            .await?;

        // Fixed trailing-30-day series for the overview chart
        let daily_last_30_days = sqlx::query_as::<_, DailyConversations>(
            r#"
            SELECT DATE(started_at) AS date,
                   COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status = 'completed') AS completed,
                   COUNT(*) FILTER (WHERE status = 'abandoned') AS abandoned,
                   COUNT(*) FILTER (WHERE status = 'active') AS active
            FROM conversations
            WHERE started_at >= NOW() - INTERVAL '30 days'
            GROUP BY DATE(started_at)
            ORDER BY date ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(Self {
            total: by_status.total(),
            by_status,
            duration,
            by_intent,
            by_outcome,
            daily_last_30_days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_counts_total() {
        let counts = StatusCounts {
            active: 3,
            completed: 10,
            abandoned: 4,
        };
        assert_eq!(counts.total(), 17);

        assert_eq!(StatusCounts::default().total(), 0);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&ConversationStatus::Abandoned).unwrap();
        assert_eq!(json, "\"abandoned\"");
    }
}
