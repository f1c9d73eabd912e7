/// Bot user model and the user summary report
///
/// A row is created by the bot the first time a phone number messages it.
/// Numbers are stored only as a hash; the dashboard never sees a phone
/// number in the clear. The running counters (`total_conversations`,
/// `total_messages`, `total_menu_interactions`) are incremented by the bot's
/// write path and read here as-is.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     phone_hash TEXT NOT NULL UNIQUE,
///     first_seen TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_seen TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     total_conversations INTEGER NOT NULL DEFAULT 0,
///     total_messages INTEGER NOT NULL DEFAULT 0,
///     total_menu_interactions INTEGER NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::filters::DateRange;

/// Columns selected for full user rows
const USER_COLUMNS: &str = "u.id, u.phone_hash, u.first_seen, u.last_seen, \
     u.total_conversations, u.total_messages, u.total_menu_interactions, u.created_at";

/// A user of the WhatsApp bot
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BotUser {
    /// Row id
    pub id: i64,

    /// Hash of the user's phone number (unique)
    pub phone_hash: String,

    /// First time this number contacted the bot
    pub first_seen: DateTime<Utc>,

    /// Most recent activity
    pub last_seen: DateTime<Utc>,

    /// Running counter maintained by the bot
    pub total_conversations: i32,

    /// Running counter maintained by the bot
    pub total_messages: i32,

    /// Running counter maintained by the bot
    pub total_menu_interactions: i32,

    /// When the row was inserted
    pub created_at: DateTime<Utc>,
}

/// Aggregates for `GET /api/users/summary`
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    /// Users whose `first_seen` falls in the range
    pub total_users: i64,

    /// Distinct users with an `active` conversation started in the range
    pub active_users: i64,

    /// Users in the range with more than one conversation
    pub recurrent_users: i64,

    /// The 10 most recently seen users in the range
    pub recent_users: Vec<BotUser>,
}

impl BotUser {
    /// Finds a user by id
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = $1");

        sqlx::query_as::<_, BotUser>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Rows for the CSV export, most recently seen first, capped at `limit`
    ///
    /// The export filters on `created_at` rather than activity timestamps so
    /// a date-bounded export is reproducible (activity keeps moving
    /// `last_seen`).
    pub async fn export_rows(
        pool: &PgPool,
        range: &DateRange,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {USER_COLUMNS} FROM users u WHERE 1=1"
        ));
        range.apply(&mut builder, "u.created_at");
        builder.push(" ORDER BY u.last_seen DESC LIMIT ");
        builder.push_bind(limit);

        builder.build_query_as::<BotUser>().fetch_all(pool).await
    }
}

impl UserSummary {
    /// Runs the four aggregate queries behind the user summary report
    pub async fn load(pool: &PgPool, range: &DateRange) -> Result<Self, sqlx::Error> {
        // Total users, filtered on when they first appeared
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users u WHERE 1=1");
        range.apply(&mut builder, "u.first_seen");
        let (total_users,): (i64,) = builder.build_query_as().fetch_one(pool).await?;

        // Users with a currently-active conversation; the date filter applies
        // to when that conversation started
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(DISTINCT u.id) \
             FROM users u \
             INNER JOIN conversations c ON u.id = c.user_id \
             WHERE c.status = 'active'",
        );
        range.apply(&mut builder, "c.started_at");
        let (active_users,): (i64,) = builder.build_query_as().fetch_one(pool).await?;

        // Users who came back for a second conversation
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM users u WHERE u.total_conversations > 1",
        );
        range.apply(&mut builder, "u.first_seen");
        let (recurrent_users,): (i64,) = builder.build_query_as().fetch_one(pool).await?;

        // The 10 most recently seen users
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {USER_COLUMNS} FROM users u WHERE 1=1"
        ));
        range.apply(&mut builder, "u.first_seen");
        builder.push(" ORDER BY u.last_seen DESC LIMIT 10");
        let recent_users = builder.build_query_as::<BotUser>().fetch_all(pool).await?;

        Ok(Self {
            total_users,
            active_users,
            recurrent_users,
            recent_users,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_columns_have_no_trailing_comma() {
        assert!(!USER_COLUMNS.trim_end().ends_with(','));
        assert_eq!(USER_COLUMNS.matches(',').count(), 7);
    }
}
