use super::{expect_object, AuthResource, ResourceCodec};
use crate::error::Error;
use crate::models::{AuthCredential, AuthEntry, ResourceKind};
use log::warn;
use serde_json::{Map, Value};

const TYPE_KEY: &str = "type";
const IN_KEY: &str = "in";
const IN_QUERY: &str = "query";

impl ResourceCodec for AuthResource {
    const KIND: ResourceKind = ResourceKind::Auth;

    type Form = Vec<AuthEntry>;

    fn from_api(document: &Value) -> Result<Vec<AuthEntry>, Error> {
        expect_object(Self::KIND, document)?;
        let entries = document
            .as_object()
            .into_iter()
            .flatten()
            .map(|(name, record)| AuthEntry::new(name.clone(), decode_credential(record)))
            .collect();
        Ok(entries)
    }

    fn to_api(form: &Vec<AuthEntry>) -> Result<Value, Error> {
        let mut document = Map::new();
        for entry in form {
            let name = entry.name.trim();
            if name.is_empty() {
                warn!("dropping auth entry without a name");
                continue;
            }
            document.insert(name.to_string(), encode_credential(&entry.credential));
        }
        Ok(Value::Object(document))
    }
}

/// Decodes one stored credential record.
///
/// The `type` discriminator is matched case-insensitively and defaults to
/// `bearer`, which is also used for records that are not objects. A missing
/// `api_key` header stays empty; see [`AuthCredential::effective_header`].
pub fn decode_credential(record: &Value) -> AuthCredential {
    let Value::Object(fields) = record else {
        return AuthCredential::bearer(record.as_str().unwrap_or_default());
    };
    let raw_kind = fields
        .get(TYPE_KEY)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|kind| !kind.is_empty());
    match raw_kind.map(str::to_ascii_lowercase).as_deref() {
        None | Some("bearer") => AuthCredential::bearer(first_text(fields, &["token", "value"])),
        Some("api_key") => AuthCredential::ApiKey {
            header: first_text(fields, &["header", "key"]),
            value: first_text(fields, &["value", "token"]),
            in_query: fields.get(IN_KEY).and_then(Value::as_str) == Some(IN_QUERY),
        },
        Some("basic") => AuthCredential::basic(
            first_text(fields, &["username", "user"]),
            first_text(fields, &["password", "pass"]),
        ),
        Some(_) => {
            let mut rest = fields.clone();
            rest.remove(TYPE_KEY);
            AuthCredential::Custom {
                kind: raw_kind.unwrap_or_default().to_string(),
                fields: rest,
            }
        }
    }
}

/// Encodes a credential with only the fields of its variant.
///
/// An empty `api_key` header is omitted.
pub fn encode_credential(credential: &AuthCredential) -> Value {
    let mut record = Map::new();
    record.insert(TYPE_KEY.to_string(), Value::String(credential.kind().to_string()));
    match credential {
        AuthCredential::Bearer { token } => {
            record.insert("token".to_string(), Value::String(token.clone()));
        }
        AuthCredential::ApiKey {
            header,
            value,
            in_query,
        } => {
            if !header.is_empty() {
                record.insert("header".to_string(), Value::String(header.clone()));
            }
            record.insert("value".to_string(), Value::String(value.clone()));
            if *in_query {
                record.insert(IN_KEY.to_string(), Value::String(IN_QUERY.to_string()));
            }
        }
        AuthCredential::Basic { username, password } => {
            record.insert("username".to_string(), Value::String(username.clone()));
            record.insert("password".to_string(), Value::String(password.clone()));
        }
        AuthCredential::Custom { fields, .. } => {
            for (key, value) in fields {
                record.insert(key.clone(), value.clone());
            }
        }
    }
    Value::Object(record)
}

fn first_text(fields: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| fields.get(*key).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
        .to_string()
}
