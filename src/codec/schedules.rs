use super::{decode_records, encode_record, ResourceCodec, SchedulesResource};
use crate::error::Error;
use crate::models::{ResourceKind, ScheduleEntry};
use serde_json::{Map, Value};

impl ResourceCodec for SchedulesResource {
    const KIND: ResourceKind = ResourceKind::Schedules;

    type Form = Vec<ScheduleEntry>;

    fn from_api(document: &Value) -> Result<Vec<ScheduleEntry>, Error> {
        decode_records(Self::KIND, document)
    }

    fn to_api(form: &Vec<ScheduleEntry>) -> Result<Value, Error> {
        form.iter()
            .map(encode_record)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}

impl ScheduleEntry {
    pub fn args_text(&self) -> String {
        match &self.args {
            Some(args) if !args.is_empty() => Value::Array(args.clone()).to_string(),
            _ => "[]".to_string(),
        }
    }

    /// Replaces the positional arguments; blank text means `[]`.
    pub fn set_args_text(&mut self, text: &str) -> Result<(), Error> {
        self.args = Some(match parse_json_text("args", text)? {
            None => Vec::new(),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(Error::validation("args", "expected a JSON array")),
        });
        self.extra.remove("args");
        Ok(())
    }

    pub fn named_text(&self) -> String {
        match &self.named {
            Some(named) if !named.is_empty() => Value::Object(named.clone()).to_string(),
            _ => "{}".to_string(),
        }
    }

    /// Replaces the named arguments; blank text means `{}`.
    pub fn set_named_text(&mut self, text: &str) -> Result<(), Error> {
        self.named = Some(match parse_json_text("named", text)? {
            None => Map::new(),
            Some(Value::Object(named)) => named,
            Some(_) => return Err(Error::validation("named", "expected a JSON object")),
        });
        self.extra.remove("named");
        Ok(())
    }
}

fn parse_json_text(field: &str, text: &str) -> Result<Option<Value>, Error> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|e| Error::validation(field, format!("not valid JSON: {e}")))
}
