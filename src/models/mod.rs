use serde::{Deserialize, Deserializer};

mod api;
mod auth;
mod common;
mod config;
mod groups;
mod schedule;

pub use api::{
    ApiEntry, RateLimit, RetryPolicy, RetrySetting, API_METHODS, MEDIA_SOURCES, RESPONSE_TYPES,
};
pub use auth::{AuthCredential, AuthEntry, DEFAULT_API_KEY_HEADER};
pub use common::{Ack, ResourceKind};
pub use config::{ConfigForm, DEFAULT_API_PORT, DEFAULT_RETRY_STATUSES, DEFAULT_TIMEOUT_SECONDS};
pub use groups::{GroupRow, GroupSlot, GroupTable, GroupsForm};
pub use schedule::{ScheduleEntry, DEFAULT_CRON};

/// Keeps an explicit JSON `null` as `Some(Value::Null)` instead of `None`.
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
