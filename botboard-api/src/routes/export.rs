/// CSV export endpoint
///
/// # Endpoints
///
/// - `GET /api/export/csv?type&from&to` - Download one table as CSV
///
/// `type` is one of `users`, `conversations`, `messages`, `menu_events`
/// (default `users`). Users and conversations are capped at 10 000 rows,
/// the high-volume tables at 50 000; the date filter applies to the
/// exported table's `created_at`, so re-running an export for a closed
/// period yields the same file.

use crate::{
    app::AppState,
    csv::{self, CsvRecord},
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use botboard_shared::{
    filters::DateRange,
    models::{
        conversation::{Conversation, ConversationExportRow},
        menu_event::{MenuEvent, MenuEventExportRow},
        message::{Message, MessageExportRow},
        user::BotUser,
    },
};
use chrono::Utc;
use serde::Deserialize;

/// Row cap for the low-volume tables
const EXPORT_LIMIT: i64 = 10_000;

/// Row cap for messages and menu events
const EXPORT_LIMIT_HIGH_VOLUME: i64 = 50_000;

/// Query parameters for the export endpoint
#[derive(Debug, Deserialize)]
pub struct ExportParams {
    /// Which table to export
    #[serde(rename = "type")]
    pub kind: Option<String>,

    pub from: Option<String>,
    pub to: Option<String>,
}

/// CSV export handler
///
/// # Errors
///
/// - `400 Bad Request`: Unknown `type` or unparseable `from`/`to`
pub async fn export_csv(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> ApiResult<Response> {
    let range = DateRange::parse(params.from.as_deref(), params.to.as_deref())?;
    let kind = params.kind.as_deref().unwrap_or("users");

    let body = match kind {
        "users" => {
            let rows = BotUser::export_rows(&state.db, &range, EXPORT_LIMIT).await?;
            csv::to_csv(&rows)
        }
        "conversations" => {
            let rows = Conversation::export_rows(&state.db, &range, EXPORT_LIMIT).await?;
            csv::to_csv(&rows)
        }
        "messages" => {
            let rows = Message::export_rows(&state.db, &range, EXPORT_LIMIT_HIGH_VOLUME).await?;
            csv::to_csv(&rows)
        }
        "menu_events" => {
            let rows = MenuEvent::export_rows(&state.db, &range, EXPORT_LIMIT_HIGH_VOLUME).await?;
            csv::to_csv(&rows)
        }
        other => {
            return Err(ApiError::BadRequest(format!(
                "Invalid export type '{}'. Use: users | conversations | messages | menu_events",
                other
            )));
        }
    };

    let filename = format!("{}_{}.csv", kind, Utc::now().format("%Y-%m-%d"));
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .map_err(|e| ApiError::InternalError(format!("Invalid disposition header: {}", e)))?;

    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/csv; charset=utf-8"),
        ),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    Ok((headers, body).into_response())
}

impl CsvRecord for BotUser {
    fn headers() -> &'static [&'static str] {
        &[
            "id",
            "phone_hash",
            "first_seen",
            "last_seen",
            "total_conversations",
            "total_messages",
            "total_menu_interactions",
            "created_at",
        ]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.phone_hash.clone(),
            csv::timestamp_field(&self.first_seen),
            csv::timestamp_field(&self.last_seen),
            self.total_conversations.to_string(),
            self.total_messages.to_string(),
            self.total_menu_interactions.to_string(),
            csv::timestamp_field(&self.created_at),
        ]
    }
}

impl CsvRecord for ConversationExportRow {
    fn headers() -> &'static [&'static str] {
        &[
            "id",
            "user_id",
            "phone_hash",
            "started_at",
            "ended_at",
            "status",
            "intent",
            "outcome",
            "total_messages",
            "duration_seconds",
        ]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.user_id.to_string(),
            csv::opt_field(&self.phone_hash),
            csv::timestamp_field(&self.started_at),
            csv::opt_timestamp_field(&self.ended_at),
            self.status.as_str().to_string(),
            csv::opt_field(&self.intent),
            csv::opt_field(&self.outcome),
            self.total_messages.to_string(),
            csv::opt_field(&self.duration_seconds),
        ]
    }
}

impl CsvRecord for MessageExportRow {
    fn headers() -> &'static [&'static str] {
        &[
            "id",
            "conversation_id",
            "user_id",
            "phone_hash",
            "direction",
            "message_type",
            "content",
            "wa_status",
            "timestamp",
        ]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.conversation_id.to_string(),
            self.user_id.to_string(),
            csv::opt_field(&self.phone_hash),
            self.direction.as_str().to_string(),
            csv::opt_field(&self.message_type),
            csv::opt_field(&self.content),
            csv::opt_field(&self.wa_status),
            csv::timestamp_field(&self.timestamp),
        ]
    }
}

impl CsvRecord for MenuEventExportRow {
    fn headers() -> &'static [&'static str] {
        &[
            "id",
            "conversation_id",
            "user_id",
            "phone_hash",
            "option_code",
            "option_title",
            "menu_level",
            "menu_category",
            "action_taken",
            "timestamp",
        ]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.conversation_id.to_string(),
            self.user_id.to_string(),
            csv::opt_field(&self.phone_hash),
            self.option_code.clone(),
            csv::opt_field(&self.option_title),
            self.menu_level.to_string(),
            csv::opt_field(&self.menu_category),
            csv::opt_field(&self.action_taken),
            csv::timestamp_field(&self.timestamp),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use botboard_shared::models::message::MessageDirection;

    #[test]
    fn test_message_export_row_to_csv() {
        let rows = vec![MessageExportRow {
            id: 1,
            conversation_id: 2,
            user_id: 3,
            phone_hash: Some("abc123".to_string()),
            direction: MessageDirection::Incoming,
            message_type: Some("text".to_string()),
            content: Some("hello, world".to_string()),
            wa_status: None,
            timestamp: chrono::DateTime::parse_from_rfc3339("2025-06-01T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }];

        let out = csv::to_csv(&rows);
        let mut lines = out.lines();

        assert_eq!(
            lines.next().unwrap(),
            "id,conversation_id,user_id,phone_hash,direction,message_type,content,wa_status,timestamp"
        );
        // The comma in the content forces quoting; the NULL wa_status is empty
        assert_eq!(
            lines.next().unwrap(),
            "1,2,3,abc123,incoming,text,\"hello, world\",,2025-06-01T10:00:00+00:00"
        );
    }
}
