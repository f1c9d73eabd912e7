/// Conversation reports
///
/// # Endpoints
///
/// - `GET /api/conversations/summary?from&to` - Aggregate conversation metrics
/// - `GET /api/conversations/user/:id?page&page_size` - One user's full
///   history, messages and menu events included

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::RangeParams,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use botboard_shared::{
    filters::{DateRange, FilterEcho, Pagination},
    models::{
        conversation::{Conversation, ConversationSummary},
        menu_event::MenuEvent,
        message::Message,
        user::BotUser,
    },
};
use futures::future;
use serde::{Deserialize, Serialize};

/// Response for `GET /api/conversations/summary`
#[derive(Debug, Serialize)]
pub struct ConversationsSummaryResponse {
    #[serde(flatten)]
    pub summary: ConversationSummary,

    /// Echo of the applied filters
    pub filters: FilterEcho,
}

/// Conversation summary handler
///
/// # Errors
///
/// - `400 Bad Request`: Unparseable `from`/`to`
pub async fn conversations_summary(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> ApiResult<Json<ConversationsSummaryResponse>> {
    let range = DateRange::parse(params.from.as_deref(), params.to.as_deref())?;

    let summary = ConversationSummary::load(&state.db, &range).await?;

    Ok(Json(ConversationsSummaryResponse {
        summary,
        filters: DateRange::echo(params.from.as_deref(), params.to.as_deref()),
    }))
}

/// Pagination query parameters for the history endpoint
#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// One conversation with its full transcript
#[derive(Debug, Serialize)]
pub struct ConversationDetail {
    #[serde(flatten)]
    pub conversation: Conversation,

    /// Messages in chronological order
    pub messages: Vec<Message>,

    /// Menu events in chronological order
    pub menu_events: Vec<MenuEvent>,
}

/// Pagination metadata returned with the page
#[derive(Debug, Serialize)]
pub struct PaginationInfo {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// Response for `GET /api/conversations/user/:id`
#[derive(Debug, Serialize)]
pub struct UserConversationsResponse {
    pub user: BotUser,
    pub conversations: Vec<ConversationDetail>,
    pub pagination: PaginationInfo,
}

/// Per-user conversation history handler
///
/// Loads a page of the user's sessions (newest first) and attaches each
/// session's messages and menu events so the dashboard can replay it.
///
/// # Errors
///
/// - `404 Not Found`: No user with that id
pub async fn user_conversations(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<UserConversationsResponse>> {
    let pagination = Pagination::from_params(params.page, params.page_size);

    let user = BotUser::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let conversations = Conversation::list_by_user(
        &state.db,
        user_id,
        pagination.page_size,
        pagination.offset(),
    )
    .await?;

    let total = Conversation::count_by_user(&state.db, user_id).await?;

    // Attach transcripts; the page is at most 100 sessions so fetching them
    // concurrently stays well within the pool.
    let conversations = future::try_join_all(conversations.into_iter().map(|conversation| {
        let db = state.db.clone();
        async move {
            let (messages, menu_events) = tokio::try_join!(
                Message::list_by_conversation(&db, conversation.id),
                MenuEvent::list_by_conversation(&db, conversation.id),
            )?;

            Ok::<_, sqlx::Error>(ConversationDetail {
                conversation,
                messages,
                menu_events,
            })
        }
    }))
    .await?;

    Ok(Json(UserConversationsResponse {
        user,
        conversations,
        pagination: PaginationInfo {
            page: pagination.page,
            page_size: pagination.page_size,
            total,
            total_pages: pagination.total_pages(total),
        },
    }))
}
