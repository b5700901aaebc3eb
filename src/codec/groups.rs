use super::{expect_object, GroupsResource, ResourceCodec};
use crate::error::Error;
use crate::models::{GroupRow, GroupTable, GroupsForm, ResourceKind};
use log::warn;
use serde_json::{Map, Value};

const TABLES: [GroupTable; 2] = [GroupTable::Users, GroupTable::Groups];

/// Splits comma-joined text into trimmed, non-empty, unique tokens in the
/// order they were typed.
pub fn split_members(text: &str) -> Vec<String> {
    let mut members: Vec<String> = Vec::new();
    for token in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !members.iter().any(|m| m == token) {
            members.push(token.to_string());
        }
    }
    members
}

pub fn join_members<S: AsRef<str>>(members: &[S]) -> String {
    members
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ResourceCodec for GroupsResource {
    const KIND: ResourceKind = ResourceKind::Groups;

    type Form = GroupsForm;

    fn from_api(document: &Value) -> Result<GroupsForm, Error> {
        expect_object(Self::KIND, document)?;
        let mut form = GroupsForm::default();
        if let Value::Object(map) = document {
            for (key, value) in map {
                match TABLES.iter().find(|table| table.key() == key) {
                    Some(table) => *form.rows_mut(*table) = decode_table(*table, value),
                    None => {
                        form.extra.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        Ok(form)
    }

    fn to_api(form: &GroupsForm) -> Result<Value, Error> {
        let mut document = Map::new();
        for table in TABLES {
            document.insert(table.key().to_string(), encode_table(table, form.rows(table)));
        }
        for (key, value) in &form.extra {
            document.insert(key.clone(), value.clone());
        }
        Ok(Value::Object(document))
    }
}

fn decode_table(table: GroupTable, value: &Value) -> Vec<GroupRow> {
    let map = match value {
        Value::Object(map) => map,
        Value::Null => return Vec::new(),
        other => {
            warn!("ignoring {table}: expected an object, got {other}");
            return Vec::new();
        }
    };
    map.iter()
        .map(|(name, members)| GroupRow::new(name.clone(), join_members(&member_tokens(members))))
        .collect()
}

fn member_tokens(members: &Value) -> Vec<String> {
    match members {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .filter(|token| !token.is_empty())
            .collect(),
        Value::String(text) => split_members(text),
        _ => Vec::new(),
    }
}

fn encode_table(table: GroupTable, rows: &[GroupRow]) -> Value {
    let mut encoded = Map::new();
    for row in rows {
        let name = row.name.trim();
        if name.is_empty() {
            warn!("dropping {table} row without a name");
            continue;
        }
        let members = split_members(&row.members)
            .into_iter()
            .map(Value::String)
            .collect();
        encoded.insert(name.to_string(), Value::Array(members));
    }
    Value::Object(encoded)
}
