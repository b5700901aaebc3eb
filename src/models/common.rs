use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// The five configuration documents served by the config service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Config,
    Apis,
    Schedules,
    Groups,
    Auth,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Config,
        ResourceKind::Apis,
        ResourceKind::Schedules,
        ResourceKind::Groups,
        ResourceKind::Auth,
    ];

    /// Path segment (and display name) of the resource.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Config => "config",
            ResourceKind::Apis => "apis",
            ResourceKind::Schedules => "schedules",
            ResourceKind::Groups => "groups",
            ResourceKind::Auth => "auth",
        }
    }

    /// List resources are fetched as bare arrays and replaced inside a
    /// single-key envelope.
    pub fn is_list(self) -> bool {
        matches!(self, ResourceKind::Apis | ResourceKind::Schedules)
    }

    /// Wraps a canonical document into the body expected by a replace call.
    pub fn envelope(self, document: Value) -> Value {
        if self.is_list() {
            let mut envelope = Map::new();
            envelope.insert(self.as_str().to_string(), document);
            Value::Object(envelope)
        } else {
            document
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acknowledgement returned by a successful replace.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub status: String,
}

impl Ack {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}
