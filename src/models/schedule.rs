use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_CRON: &str = "0 9 * * *";

/// One entry of the `schedules` list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScheduleEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_session: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScheduleEntry {
    /// Entry inserted by "add schedule".
    pub fn template() -> Self {
        Self {
            api_key: Some(String::new()),
            cron: Some(DEFAULT_CRON.to_string()),
            args: Some(Vec::new()),
            named: Some(Map::new()),
            target_session: Some(String::new()),
            ..Self::default()
        }
    }

    /// Absent `enabled` counts as enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled != Some(false)
    }
}
