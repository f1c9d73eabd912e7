/// Menu event model, the funnel report, and the top-services report
///
/// The bot's menus form a tree: level 0 is the main menu, level 1 the
/// category list, level 2 the services inside a category. Every selection
/// the user makes is logged here. Option codes are namespaced by the bot:
/// `CAT|<id>` for category options, `SERV|<id>` for service options, which
/// is what the top-services queries key on.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE menu_events (
///     id BIGSERIAL PRIMARY KEY,
///     conversation_id BIGINT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     option_code TEXT NOT NULL,
///     option_title TEXT,
///     menu_level INTEGER NOT NULL DEFAULT 0,
///     menu_category TEXT,
///     action_taken TEXT,
///     timestamp TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::filters::DateRange;
use crate::models::conversation::OUTCOME_BOOKING_CONFIRMED;

/// One menu selection
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MenuEvent {
    /// Row id
    pub id: i64,

    /// Owning conversation
    pub conversation_id: i64,

    /// Owning user
    pub user_id: i64,

    /// Namespaced option code (`CAT|...`, `SERV|...`, or a bare action code)
    pub option_code: String,

    /// Human-readable option label at selection time
    pub option_title: Option<String>,

    /// Depth in the menu tree (0 = main menu)
    pub menu_level: i32,

    /// Category context the selection happened in
    pub menu_category: Option<String>,

    /// What the selection did (`view`, `book`, `back`, `exit`); NULL means a
    /// plain view
    pub action_taken: Option<String>,

    /// When the selection happened
    pub timestamp: DateTime<Utc>,

    /// When the row was inserted
    pub created_at: DateTime<Utc>,
}

/// Interactions at one menu depth
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LevelStats {
    pub menu_level: i32,
    pub total_interactions: i64,
    pub unique_users: i64,
    pub unique_conversations: i64,
}

/// Interactions inside one category
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CategoryStats {
    /// Category name, `"unknown"` for events outside any category
    pub category: String,
    pub total: i64,
    pub unique_users: i64,
}

/// Interactions per action kind
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ActionStats {
    /// Action name, NULL collapsed to `"view"`
    pub action: String,
    pub total: i64,
    pub unique_users: i64,
}

/// Selection counts for one menu option
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OptionStats {
    pub option_code: String,
    pub option_title: Option<String>,
    pub selections: i64,
    pub unique_users: i64,
}

/// How far conversations get through the menu tree
#[derive(Debug, Clone, Copy, Serialize, sqlx::FromRow)]
pub struct FunnelCounts {
    /// Conversations that opened the main menu at all
    pub reached_menu: i64,

    /// Conversations that entered a category
    pub reached_category: i64,

    /// Conversations that viewed a service
    pub reached_service: i64,

    /// Conversations that triggered the booking action
    pub reached_booking: i64,
}

/// Aggregates for `GET /api/menu/funnel`
#[derive(Debug, Clone, Serialize)]
pub struct MenuFunnel {
    pub by_level: Vec<LevelStats>,
    pub by_category: Vec<CategoryStats>,
    pub by_action: Vec<ActionStats>,
    pub level_0_options: Vec<OptionStats>,
    pub level_1_options: Vec<OptionStats>,
    pub funnel: FunnelCounts,
}

/// View counts for one service option
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TopService {
    pub option_code: String,
    pub option_title: Option<String>,
    pub total_views: i64,
    pub unique_users: i64,
    pub unique_conversations: i64,
    pub last_viewed: Option<DateTime<Utc>>,
}

/// View counts for one category option
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TopCategory {
    pub option_code: String,
    pub option_title: Option<String>,
    pub total_views: i64,
    pub unique_users: i64,
}

/// Views vs. confirmed bookings for one service
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ServiceConversion {
    pub option_code: String,
    pub option_title: Option<String>,

    /// Conversations that viewed the service
    pub viewed: i64,

    /// Of those, conversations that ended in a confirmed booking
    pub converted: i64,
}

/// Export row joining in the owner's phone hash
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MenuEventExportRow {
    pub id: i64,
    pub conversation_id: i64,
    pub user_id: i64,
    pub phone_hash: Option<String>,
    pub option_code: String,
    pub option_title: Option<String>,
    pub menu_level: i32,
    pub menu_category: Option<String>,
    pub action_taken: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl MenuEvent {
    /// All menu events of one conversation, oldest first
    pub async fn list_by_conversation(
        pool: &PgPool,
        conversation_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, MenuEvent>(
            r#"
            SELECT id, conversation_id, user_id, option_code, option_title,
                   menu_level, menu_category, action_taken, timestamp, created_at
            FROM menu_events
            WHERE conversation_id = $1
            ORDER BY timestamp ASC
            "#,
        )
        .bind(conversation_id)
        .fetch_all(pool)
        .await
    }

    /// Top service options by views, capped at `limit`
    pub async fn top_services(
        pool: &PgPool,
        range: &DateRange,
        limit: i64,
    ) -> Result<Vec<TopService>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT option_code, option_title, \
                    COUNT(*) AS total_views, \
                    COUNT(DISTINCT user_id) AS unique_users, \
                    COUNT(DISTINCT conversation_id) AS unique_conversations, \
                    MAX(timestamp) AS last_viewed \
             FROM menu_events \
             WHERE option_code LIKE 'SERV|%'",
        );
        range.apply(&mut builder, "timestamp");
        builder.push(" GROUP BY option_code, option_title ORDER BY total_views DESC LIMIT ");
        builder.push_bind(limit);

        builder.build_query_as::<TopService>().fetch_all(pool).await
    }

    /// Top 10 category options by views
    pub async fn top_categories(
        pool: &PgPool,
        range: &DateRange,
    ) -> Result<Vec<TopCategory>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT option_code, option_title, \
                    COUNT(*) AS total_views, \
                    COUNT(DISTINCT user_id) AS unique_users \
             FROM menu_events \
             WHERE option_code LIKE 'CAT|%'",
        );
        range.apply(&mut builder, "timestamp");
        builder.push(" GROUP BY option_code, option_title ORDER BY total_views DESC LIMIT 10");

        builder
            .build_query_as::<TopCategory>()
            .fetch_all(pool)
            .await
    }

    /// Per-service conversion: conversations that viewed the service vs.
    /// those that ended with a confirmed booking
    pub async fn conversion_by_service(
        pool: &PgPool,
        range: &DateRange,
    ) -> Result<Vec<ServiceConversion>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT me.option_code, me.option_title, \
                    COUNT(DISTINCT me.conversation_id) AS viewed, \
                    COUNT(DISTINCT c.id) FILTER (WHERE c.outcome = ",
        );
        builder.push_bind(OUTCOME_BOOKING_CONFIRMED);
        builder.push(
            ") AS converted \
             FROM menu_events me \
             LEFT JOIN conversations c ON me.conversation_id = c.id \
             WHERE me.option_code LIKE 'SERV|%'",
        );
        range.apply(&mut builder, "me.timestamp");
        builder.push(" GROUP BY me.option_code, me.option_title ORDER BY viewed DESC LIMIT 10");

        builder
            .build_query_as::<ServiceConversion>()
            .fetch_all(pool)
            .await
    }

    /// Rows for the CSV export, newest first, capped at `limit`
    pub async fn export_rows(
        pool: &PgPool,
        range: &DateRange,
        limit: i64,
    ) -> Result<Vec<MenuEventExportRow>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT me.id, me.conversation_id, me.user_id, u.phone_hash, me.option_code, \
                    me.option_title, me.menu_level, me.menu_category, me.action_taken, me.timestamp \
             FROM menu_events me \
             LEFT JOIN users u ON me.user_id = u.id \
             WHERE 1=1",
        );
        range.apply(&mut builder, "me.created_at");
        builder.push(" ORDER BY me.timestamp DESC LIMIT ");
        builder.push_bind(limit);

        builder
            .build_query_as::<MenuEventExportRow>()
            .fetch_all(pool)
            .await
    }
}

impl MenuFunnel {
    /// Runs the aggregate queries behind the menu funnel report
    pub async fn load(pool: &PgPool, range: &DateRange) -> Result<Self, sqlx::Error> {
        // Volume per menu depth
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT menu_level, \
                    COUNT(*) AS total_interactions, \
                    COUNT(DISTINCT user_id) AS unique_users, \
                    COUNT(DISTINCT conversation_id) AS unique_conversations \
             FROM menu_events WHERE 1=1",
        );
        range.apply(&mut builder, "timestamp");
        builder.push(" GROUP BY menu_level ORDER BY menu_level ASC");
        let by_level = builder.build_query_as::<LevelStats>().fetch_all(pool).await?;

        // Volume per category
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT COALESCE(menu_category, 'unknown') AS category, \
                    COUNT(*) AS total, \
                    COUNT(DISTINCT user_id) AS unique_users \
             FROM menu_events WHERE 1=1",
        );
        range.apply(&mut builder, "timestamp");
        builder.push(" GROUP BY menu_category ORDER BY total DESC");
        let by_category = builder
            .build_query_as::<CategoryStats>()
            .fetch_all(pool)
            .await?;

        // Volume per action; NULL action is a plain view
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT COALESCE(action_taken, 'view') AS action, \
                    COUNT(*) AS total, \
                    COUNT(DISTINCT user_id) AS unique_users \
             FROM menu_events WHERE 1=1",
        );
        range.apply(&mut builder, "timestamp");
        builder.push(" GROUP BY action_taken ORDER BY total DESC");
        let by_action = builder
            .build_query_as::<ActionStats>()
            .fetch_all(pool)
            .await?;

        // Main-menu options by popularity
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT option_code, option_title, \
                    COUNT(*) AS selections, \
                    COUNT(DISTINCT user_id) AS unique_users \
             FROM menu_events WHERE menu_level = 0",
        );
        range.apply(&mut builder, "timestamp");
        builder.push(" GROUP BY option_code, option_title ORDER BY selections DESC");
        let level_0_options = builder
            .build_query_as::<OptionStats>()
            .fetch_all(pool)
            .await?;

        // Category-level options by popularity
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT option_code, option_title, \
                    COUNT(*) AS selections, \
                    COUNT(DISTINCT user_id) AS unique_users \
             FROM menu_events WHERE menu_level = 1",
        );
        range.apply(&mut builder, "timestamp");
        builder.push(" GROUP BY option_code, option_title ORDER BY selections DESC LIMIT 15");
        let level_1_options = builder
            .build_query_as::<OptionStats>()
            .fetch_all(pool)
            .await?;

        // How deep conversations get before dropping off
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(DISTINCT CASE WHEN menu_level >= 0 THEN conversation_id END) AS reached_menu, \
                    COUNT(DISTINCT CASE WHEN menu_level >= 1 THEN conversation_id END) AS reached_category, \
                    COUNT(DISTINCT CASE WHEN menu_level >= 2 THEN conversation_id END) AS reached_service, \
                    COUNT(DISTINCT CASE WHEN action_taken = 'book' THEN conversation_id END) AS reached_booking \
             FROM menu_events WHERE 1=1",
        );
        range.apply(&mut builder, "timestamp");
        let funnel = builder
            .build_query_as::<FunnelCounts>()
            .fetch_one(pool)
            .await?;

        Ok(Self {
            by_level,
            by_category,
            by_action,
            level_0_options,
            level_1_options,
            funnel,
        })
    }
}
