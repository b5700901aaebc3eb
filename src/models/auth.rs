use serde_json::{Map, Value};

pub const DEFAULT_API_KEY_HEADER: &str = "X-API-Key";

/// Credential record stored under a name in the `auth` document.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthCredential {
    /// `{type: "bearer", token}`
    Bearer { token: String },
    /// `{type: "api_key", header, value, in?: "query"}`
    ApiKey {
        header: String,
        value: String,
        in_query: bool,
    },
    /// `{type: "basic", username, password}`
    Basic { username: String, password: String },
    /// Any other `type`; its remaining fields are sent as raw headers.
    Custom {
        kind: String,
        fields: Map<String, Value>,
    },
}

impl AuthCredential {
    pub fn bearer(token: impl Into<String>) -> Self {
        AuthCredential::Bearer {
            token: token.into(),
        }
    }

    pub fn api_key(header: impl Into<String>, value: impl Into<String>, in_query: bool) -> Self {
        AuthCredential::ApiKey {
            header: header.into(),
            value: value.into(),
            in_query,
        }
    }

    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        AuthCredential::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Value of the `type` discriminator.
    pub fn kind(&self) -> &str {
        match self {
            AuthCredential::Bearer { .. } => "bearer",
            AuthCredential::ApiKey { .. } => "api_key",
            AuthCredential::Basic { .. } => "basic",
            AuthCredential::Custom { kind, .. } => kind,
        }
    }

    /// Header an `api_key` credential is sent in; an empty header means
    /// [`DEFAULT_API_KEY_HEADER`].
    pub fn effective_header(&self) -> Option<&str> {
        match self {
            AuthCredential::ApiKey { header, .. } if header.is_empty() => {
                Some(DEFAULT_API_KEY_HEADER)
            }
            AuthCredential::ApiKey { header, .. } => Some(header),
            _ => None,
        }
    }
}

impl Default for AuthCredential {
    fn default() -> Self {
        AuthCredential::bearer("")
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AuthEntry {
    pub name: String,
    pub credential: AuthCredential,
}

impl AuthEntry {
    pub fn new(name: impl Into<String>, credential: AuthCredential) -> Self {
        Self {
            name: name.into(),
            credential,
        }
    }
}
