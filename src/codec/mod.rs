//! Pure mappings between the persisted JSON documents and the forms that
//! are edited in memory.
//!
//! Every codec is deterministic and free of I/O. Encoding elides optional
//! groups that ended up with no members, so `to_api(from_api(doc))` equals
//! `doc` for canonical documents, and an empty group is equivalent to an
//! absent one.
//!
//! The remote service owns validation. A known key whose stored value does
//! not fit its typed field (a string where a number is expected, an
//! explicit `null`) is held verbatim in the record's `extra` map and written
//! back unchanged until an editor sets that field.

use crate::error::Error;
use crate::models::{ApiEntry, ConfigForm, ResourceKind, ScheduleEntry};
use crate::session::Editable;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

mod apis;
mod auth;
mod config;
mod groups;
mod numbers;
mod schedules;

pub use apis::{
    merge_rate_limit, merge_retry_backoff, merge_retry_count, ApiJsonField, RateLimitField,
    RateLimitScope,
};
pub use auth::{decode_credential, encode_credential};
pub use groups::{join_members, split_members};
pub use numbers::{parse_optional_count, parse_optional_number};

/// Codec for one resource kind.
pub trait ResourceCodec {
    const KIND: ResourceKind;

    type Form: Editable + Clone + fmt::Debug + PartialEq;

    /// Decodes the document returned by a fetch.
    fn from_api(document: &Value) -> Result<Self::Form, Error>;

    /// Encodes the form into the canonical document sent by a replace.
    fn to_api(form: &Self::Form) -> Result<Value, Error>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigResource;

#[derive(Debug, Clone, Copy, Default)]
pub struct ApisResource;

#[derive(Debug, Clone, Copy, Default)]
pub struct SchedulesResource;

#[derive(Debug, Clone, Copy, Default)]
pub struct GroupsResource;

#[derive(Debug, Clone, Copy, Default)]
pub struct AuthResource;

/// Stored object decoded into typed fields plus a flattened `extra` map.
pub(crate) trait Record: Serialize + DeserializeOwned + Clone {
    fn extra_mut(&mut self) -> &mut Map<String, Value>;
}

impl Record for ApiEntry {
    fn extra_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.extra
    }
}

impl Record for ConfigForm {
    fn extra_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.extra
    }
}

impl Record for ScheduleEntry {
    fn extra_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.extra
    }
}

/// Decodes one stored object, holding keys that do not fit their typed
/// field in `extra`.
fn decode_record<T: Record>(kind: ResourceKind, record: &Value) -> Result<T, Error> {
    let Value::Object(fields) = record else {
        return Err(Error::validation(kind.as_str(), "expected a JSON object"));
    };
    let (typed, held): (Map<String, Value>, Map<String, Value>) = fields
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .partition(|(key, value)| fits_typed_field::<T>(key, value));
    let mut decoded = T::deserialize(&Value::Object(typed))
        .map_err(|e| Error::validation(kind.as_str(), e.to_string()))?;
    if !held.is_empty() {
        debug!(
            "{kind}: holding {} key(s) as stored: {}",
            held.len(),
            held.keys().cloned().collect::<Vec<_>>().join(", ")
        );
    }
    decoded.extra_mut().extend(held);
    Ok(decoded)
}

fn decode_records<T: Record>(kind: ResourceKind, document: &Value) -> Result<Vec<T>, Error> {
    let Value::Array(items) = document else {
        return Err(Error::validation(kind.as_str(), "expected a JSON array"));
    };
    items.iter().map(|item| decode_record(kind, item)).collect()
}

/// True when `{key: value}` decodes and encodes back with `key` present.
fn fits_typed_field<T: Record>(key: &str, value: &Value) -> bool {
    let single = Value::Object(Map::from_iter([(key.to_string(), value.clone())]));
    T::deserialize(&single)
        .ok()
        .and_then(|decoded| serde_json::to_value(decoded).ok())
        .is_some_and(|encoded| encoded.get(key).is_some())
}

/// Encodes a record; a typed field that is set wins over a held value.
fn encode_record<T: Record>(record: &T) -> Result<Value, Error> {
    let mut typed = record.clone();
    let held = std::mem::take(typed.extra_mut());
    let mut document = match serde_json::to_value(&typed)? {
        Value::Object(document) => document,
        other => return Ok(other),
    };
    for (key, value) in held {
        document.entry(key).or_insert(value);
    }
    Ok(Value::Object(document))
}

fn expect_object(kind: ResourceKind, document: &Value) -> Result<(), Error> {
    if document.is_object() {
        Ok(())
    } else {
        Err(Error::validation(kind.as_str(), "expected a JSON object"))
    }
}
