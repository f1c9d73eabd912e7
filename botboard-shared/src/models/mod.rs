/// Entity models and report queries
///
/// One module per table the bot writes and the dashboard reads. Each module
/// owns the entity struct, its row-level lookups, and the aggregate queries
/// behind the report endpoint that covers it. Counter consistency and
/// uniqueness are enforced by the schema and the bot's write path, never
/// in-process here.
///
/// # Models
///
/// - `user`: Bot users keyed by phone hash, with running activity counters
/// - `conversation`: Bot sessions with status/intent/outcome and duration
/// - `message`: Individual WhatsApp messages with direction and delivery state
/// - `menu_event`: Menu navigation events (option, level, category, action)
/// - `raw_event`: Unparsed webhook lines kept for debugging

pub mod conversation;
pub mod menu_event;
pub mod message;
pub mod raw_event;
pub mod user;
