pub mod user;
pub mod entry;
pub mod tag;
pub mod gratitude;

pub use user::User;
pub use entry::{Entry, EntryDetail, Mood, UnknownMood};
pub use tag::{Tag, TagCount};
pub use gratitude::GratitudeItem;

/// Timestamps are stored as fixed-width RFC 3339 strings so that ordering
/// the TEXT column agrees with chronological order.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
