use super::ConsoleClient;
use crate::error::Error;
use crate::models::{Ack, ResourceKind};
use serde_json::{Map, Value};

impl ConsoleClient {
    /// Retrieves the global settings document.
    pub async fn get_config(&self) -> Result<Map<String, Value>, Error> {
        object(ResourceKind::Config, self.fetch(ResourceKind::Config).await?)
    }

    /// Replaces the global settings document.
    pub async fn put_config(&self, config: Map<String, Value>) -> Result<Ack, Error> {
        self.replace(ResourceKind::Config, Value::Object(config))
            .await
    }

    /// Retrieves the API entry list.
    pub async fn get_apis(&self) -> Result<Vec<Value>, Error> {
        array(ResourceKind::Apis, self.fetch(ResourceKind::Apis).await?)
    }

    /// Replaces the whole API entry list, sent as `{"apis": [...]}`.
    pub async fn put_apis(&self, apis: Vec<Value>) -> Result<Ack, Error> {
        self.replace(ResourceKind::Apis, Value::Array(apis)).await
    }

    pub async fn get_schedules(&self) -> Result<Vec<Value>, Error> {
        array(
            ResourceKind::Schedules,
            self.fetch(ResourceKind::Schedules).await?,
        )
    }

    /// Replaces the whole schedule list, sent as `{"schedules": [...]}`.
    pub async fn put_schedules(&self, schedules: Vec<Value>) -> Result<Ack, Error> {
        self.replace(ResourceKind::Schedules, Value::Array(schedules))
            .await
    }

    pub async fn get_groups(&self) -> Result<Map<String, Value>, Error> {
        object(ResourceKind::Groups, self.fetch(ResourceKind::Groups).await?)
    }

    pub async fn put_groups(&self, groups: Map<String, Value>) -> Result<Ack, Error> {
        self.replace(ResourceKind::Groups, Value::Object(groups))
            .await
    }

    pub async fn get_auth(&self) -> Result<Map<String, Value>, Error> {
        object(ResourceKind::Auth, self.fetch(ResourceKind::Auth).await?)
    }

    pub async fn put_auth(&self, auth: Map<String, Value>) -> Result<Ack, Error> {
        self.replace(ResourceKind::Auth, Value::Object(auth)).await
    }
}

fn object(kind: ResourceKind, document: Value) -> Result<Map<String, Value>, Error> {
    match document {
        Value::Object(map) => Ok(map),
        _ => Err(Error::validation(kind.as_str(), "expected a JSON object")),
    }
}

fn array(kind: ResourceKind, document: Value) -> Result<Vec<Value>, Error> {
    match document {
        Value::Array(items) => Ok(items),
        _ => Err(Error::validation(kind.as_str(), "expected a JSON array")),
    }
}
