use super::groups::{join_members, split_members};
use super::numbers::{merge_pair, PairField};
use super::{decode_records, encode_record, ApisResource, ResourceCodec};
use crate::error::Error;
use crate::models::{ApiEntry, GroupTable, RateLimit, ResourceKind, RetryPolicy, RetrySetting};
use serde_json::{Map, Number, Value};

/// Which rate limit of an API entry is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitScope {
    /// `rate_limit`, counted per user.
    PerUser,
    /// `rate_limit_global`, counted across all users.
    Global,
}

impl RateLimitScope {
    pub fn as_str(self) -> &'static str {
        match self {
            RateLimitScope::PerUser => "rate_limit",
            RateLimitScope::Global => "rate_limit_global",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitField {
    Max,
    WindowSeconds,
}

/// Free-form JSON members of an API entry edited as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiJsonField {
    Headers,
    Params,
    Body,
}

impl ApiJsonField {
    pub fn as_str(self) -> &'static str {
        match self {
            ApiJsonField::Headers => "headers",
            ApiJsonField::Params => "params",
            ApiJsonField::Body => "body",
        }
    }

    fn blank_value(self) -> Value {
        match self {
            ApiJsonField::Body => Value::Null,
            _ => Value::Object(Map::new()),
        }
    }
}

impl ResourceCodec for ApisResource {
    const KIND: ResourceKind = ResourceKind::Apis;

    type Form = Vec<ApiEntry>;

    fn from_api(document: &Value) -> Result<Vec<ApiEntry>, Error> {
        decode_records(Self::KIND, document)
    }

    fn to_api(form: &Vec<ApiEntry>) -> Result<Value, Error> {
        form.iter()
            .map(|entry| encode_record(&entry.canonical()))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}

/// Applies an edit of the retry count to an entry's retry override.
///
/// `Some(0)` disables retries outright.
pub fn merge_retry_count(current: Option<RetrySetting>, value: Option<u64>) -> Option<RetrySetting> {
    if value == Some(0) {
        return Some(RetrySetting::Disabled);
    }
    merge_retry(current, PairField::First, value.map(Number::from))
}

/// Applies an edit of the retry backoff to an entry's retry override.
pub fn merge_retry_backoff(
    current: Option<RetrySetting>,
    value: Option<Number>,
) -> Option<RetrySetting> {
    if value.is_none() && current == Some(RetrySetting::Disabled) {
        return current;
    }
    merge_retry(current, PairField::Second, value)
}

fn merge_retry(
    current: Option<RetrySetting>,
    field: PairField,
    value: Option<Number>,
) -> Option<RetrySetting> {
    let pair = match current {
        Some(RetrySetting::Policy(policy)) => Some((policy.max_attempts, policy.backoff_seconds)),
        _ => None,
    };
    merge_pair(pair, field, value, (None, Some(Number::from(1u64)))).map(
        |(max_attempts, backoff_seconds)| {
            RetrySetting::Policy(RetryPolicy {
                max_attempts,
                backoff_seconds,
            })
        },
    )
}

/// Applies an edit of one rate-limit member.
pub fn merge_rate_limit(
    current: Option<RateLimit>,
    field: RateLimitField,
    value: Option<Number>,
) -> Option<RateLimit> {
    let pair = current.map(|limit| (limit.max, limit.window_seconds));
    let field = match field {
        RateLimitField::Max => PairField::First,
        RateLimitField::WindowSeconds => PairField::Second,
    };
    merge_pair(pair, field, value, (None, None))
        .map(|(max, window_seconds)| RateLimit { max, window_seconds })
}

impl ApiEntry {
    pub fn set_retry_max_attempts(&mut self, value: Option<u64>) {
        self.retry = merge_retry_count(self.retry.take(), value);
        self.extra.remove("retry");
    }

    pub fn set_retry_backoff_seconds(&mut self, value: Option<Number>) {
        self.retry = merge_retry_backoff(self.retry.take(), value);
        self.extra.remove("retry");
    }

    pub fn set_rate_limit(
        &mut self,
        scope: RateLimitScope,
        field: RateLimitField,
        value: Option<Number>,
    ) {
        let slot = match scope {
            RateLimitScope::PerUser => &mut self.rate_limit,
            RateLimitScope::Global => &mut self.rate_limit_global,
        };
        *slot = merge_rate_limit(slot.take(), field, value);
        self.extra.remove(scope.as_str());
    }

    /// Text shown in the editor for a JSON member.
    pub fn json_field_text(&self, field: ApiJsonField) -> String {
        let value = match field {
            ApiJsonField::Headers => self.headers.as_ref(),
            ApiJsonField::Params => self.params.as_ref(),
            ApiJsonField::Body => self.body.as_ref(),
        };
        match (field, value) {
            (ApiJsonField::Body, None | Some(Value::Null)) => String::new(),
            (_, None | Some(Value::Null)) => "{}".to_string(),
            (_, Some(Value::String(text))) => text.clone(),
            (_, Some(value)) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }

    /// Replaces a JSON member from editor text.
    ///
    /// Blank text means `{}` for headers/params and `null` for the body.
    /// Invalid JSON leaves the entry untouched.
    pub fn set_json_field(&mut self, field: ApiJsonField, text: &str) -> Result<(), Error> {
        let trimmed = text.trim();
        let value = if trimmed.is_empty() {
            field.blank_value()
        } else {
            serde_json::from_str(trimmed).map_err(|e| {
                Error::validation(field.as_str(), format!("not valid JSON: {e}"))
            })?
        };
        let slot = match field {
            ApiJsonField::Headers => &mut self.headers,
            ApiJsonField::Params => &mut self.params,
            ApiJsonField::Body => &mut self.body,
        };
        *slot = Some(value);
        self.extra.remove(field.as_str());
        Ok(())
    }

    /// Allowed group names as comma-joined text.
    pub fn allowed_groups_text(&self, table: GroupTable) -> String {
        let names = match table {
            GroupTable::Users => self.allowed_user_groups.as_deref(),
            GroupTable::Groups => self.allowed_group_groups.as_deref(),
        };
        join_members(names.unwrap_or_default())
    }

    /// Replaces the allowed group names; blank text removes the restriction.
    pub fn set_allowed_groups_text(&mut self, table: GroupTable, text: &str) {
        let names = split_members(text);
        let names = if names.is_empty() { None } else { Some(names) };
        let key = match table {
            GroupTable::Users => {
                self.allowed_user_groups = names;
                "allowed_user_groups"
            }
            GroupTable::Groups => {
                self.allowed_group_groups = names;
                "allowed_group_groups"
            }
        };
        self.extra.remove(key);
    }

    /// Copy with empty optional groups collapsed to absent.
    pub(crate) fn canonical(&self) -> ApiEntry {
        let mut entry = self.clone();
        if matches!(&entry.retry, Some(RetrySetting::Policy(policy)) if policy.is_empty()) {
            entry.retry = None;
        }
        if entry.rate_limit.as_ref().is_some_and(RateLimit::is_empty) {
            entry.rate_limit = None;
        }
        if entry
            .rate_limit_global
            .as_ref()
            .is_some_and(RateLimit::is_empty)
        {
            entry.rate_limit_global = None;
        }
        entry
    }
}
