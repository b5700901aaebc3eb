use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

use super::present;

pub const API_METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];
pub const RESPONSE_TYPES: [&str; 4] = ["text", "image", "video", "audio"];
pub const MEDIA_SOURCES: [&str; 2] = ["url", "body"];

/// Explicit retry policy, `{max_attempts, backoff_seconds}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_seconds: Option<Number>,
}

impl RetryPolicy {
    pub fn is_empty(&self) -> bool {
        self.max_attempts.is_none() && self.backoff_seconds.is_none()
    }
}

/// Per-API retry override. Absence (`None` on the entry) inherits the
/// global policy.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrySetting {
    /// Persisted as `false`; a stored `0` decodes to this too.
    Disabled,
    Policy(RetryPolicy),
}

impl Serialize for RetrySetting {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RetrySetting::Disabled => serializer.serialize_bool(false),
            RetrySetting::Policy(policy) => policy.serialize(serializer),
        }
    }
}

pub(crate) fn deserialize_retry<'de, D>(deserializer: D) -> Result<Option<RetrySetting>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(false) => Ok(Some(RetrySetting::Disabled)),
        Value::Number(n) if n.as_f64() == Some(0.0) => Ok(Some(RetrySetting::Disabled)),
        value @ Value::Object(_) => serde_json::from_value(value)
            .map(|policy| Some(RetrySetting::Policy(policy)))
            .map_err(D::Error::custom),
        // Anything else behaves like an absent override at runtime.
        _ => Ok(None),
    }
}

/// Sliding-window limit, `{max, window_seconds}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RateLimit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_seconds: Option<Number>,
}

impl RateLimit {
    pub fn is_empty(&self) -> bool {
        self.max.is_none() && self.window_seconds.is_none()
    }
}

/// One entry of the `apis` list.
///
/// Keys this type does not model are kept in `extra` and written back as-is.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApiEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub headers: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub params: Option<Value>,
    /// `Some(Value::Null)` is an explicit `"body": null`.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_media_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_user_groups: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_group_groups: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<Number>,
    #[serde(
        default,
        deserialize_with = "deserialize_retry",
        skip_serializing_if = "Option::is_none"
    )]
    pub retry: Option<RetrySetting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit_global: Option<RateLimit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApiEntry {
    /// Entry inserted by "add API".
    pub fn template() -> Self {
        Self {
            enabled: Some(true),
            id: Some("new".to_string()),
            command: Some("new".to_string()),
            name: Some("New API".to_string()),
            method: Some(API_METHODS[0].to_string()),
            url: Some(String::new()),
            headers: Some(Value::Object(Map::new())),
            params: Some(Value::Object(Map::new())),
            body: Some(Value::Null),
            response_type: Some(RESPONSE_TYPES[0].to_string()),
            response_path: Some(String::new()),
            response_media_from: Some(MEDIA_SOURCES[0].to_string()),
            description: Some(String::new()),
            ..Self::default()
        }
    }

    /// Absent `enabled` counts as enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled != Some(false)
    }

    pub fn toggle_enabled(&mut self) {
        self.enabled = Some(!self.is_enabled());
        self.extra.remove("enabled");
    }

    /// Label shown in listings: the command, falling back to the id.
    pub fn display_label(&self) -> &str {
        self.command
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or_default()
    }
}
