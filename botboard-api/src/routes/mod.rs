/// API route handlers
///
/// One module per resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Admin login
/// - `overview`: Quick metrics card data
/// - `users`: User summary report
/// - `conversations`: Conversation summary and per-user history
/// - `messages`: Peak-hours report
/// - `menu`: Menu funnel report
/// - `services`: Top-services report
/// - `export`: CSV download
/// - `raw_events`: Raw webhook debugging feed

pub mod auth;
pub mod conversations;
pub mod export;
pub mod health;
pub mod menu;
pub mod messages;
pub mod overview;
pub mod raw_events;
pub mod services;
pub mod users;

use serde::Deserialize;

/// The `from`/`to` query parameters every report accepts
#[derive(Debug, Deserialize)]
pub struct RangeParams {
    /// Inclusive lower bound (`YYYY-MM-DD` or RFC 3339)
    pub from: Option<String>,

    /// Inclusive upper bound (`YYYY-MM-DD` or RFC 3339)
    pub to: Option<String>,
}
