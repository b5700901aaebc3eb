use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::api::RetryPolicy;

pub const DEFAULT_API_PORT: u16 = 5787;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_RETRY_STATUSES: [i64; 4] = [500, 502, 503, 429];

/// Global settings document (`config`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfigForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_port: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register_commands: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_statuses: Option<Vec<i64>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
