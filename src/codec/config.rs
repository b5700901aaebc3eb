use super::numbers::{merge_pair, parse_optional_count, PairField};
use super::{decode_record, encode_record, ConfigResource, ResourceCodec};
use crate::error::Error;
use crate::models::{
    ConfigForm, ResourceKind, RetryPolicy, DEFAULT_API_PORT, DEFAULT_RETRY_STATUSES,
    DEFAULT_TIMEOUT_SECONDS,
};
use serde_json::{Number, Value};

impl ResourceCodec for ConfigResource {
    const KIND: ResourceKind = ResourceKind::Config;

    type Form = ConfigForm;

    fn from_api(document: &Value) -> Result<ConfigForm, Error> {
        decode_record(Self::KIND, document)
    }

    fn to_api(form: &ConfigForm) -> Result<Value, Error> {
        let mut canonical = form.clone();
        if canonical.retry.as_ref().is_some_and(RetryPolicy::is_empty) {
            canonical.retry = None;
        }
        encode_record(&canonical)
    }
}

impl ConfigForm {
    /// Port the API process listens on, or the default when unset.
    pub fn api_port_or_default(&self) -> u16 {
        self.api_port
            .as_ref()
            .and_then(Number::as_u64)
            .and_then(|port| u16::try_from(port).ok())
            .unwrap_or(DEFAULT_API_PORT)
    }

    pub fn timeout_seconds_or_default(&self) -> f64 {
        self.timeout_seconds
            .as_ref()
            .and_then(Number::as_f64)
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS as f64)
    }

    pub fn set_api_port_text(&mut self, text: &str) -> Result<(), Error> {
        let port = parse_optional_count("api_port", text)?;
        if let Some(port) = port {
            if !(1..=u64::from(u16::MAX)).contains(&port) {
                return Err(Error::validation(
                    "api_port",
                    format!("{port} is outside 1-65535"),
                ));
            }
        }
        self.api_port = port.map(Number::from);
        self.extra.remove("api_port");
        Ok(())
    }

    pub fn set_timeout_seconds_text(&mut self, text: &str) -> Result<(), Error> {
        self.timeout_seconds = super::parse_optional_number("timeout_seconds", text)?;
        self.extra.remove("timeout_seconds");
        Ok(())
    }

    pub fn set_retry_max_attempts(&mut self, value: Option<Number>) {
        self.retry = merge_retry_policy(self.retry.take(), PairField::First, value);
        self.extra.remove("retry");
    }

    pub fn set_retry_backoff_seconds(&mut self, value: Option<Number>) {
        self.retry = merge_retry_policy(self.retry.take(), PairField::Second, value);
        self.extra.remove("retry");
    }

    /// Statuses the API process retries on; the built-in list when unset.
    pub fn retry_statuses_or_default(&self) -> Vec<i64> {
        self.retry_statuses
            .clone()
            .unwrap_or_else(|| DEFAULT_RETRY_STATUSES.to_vec())
    }

    /// Retryable status codes as comma-separated text.
    pub fn retry_statuses_text(&self) -> String {
        self.retry_statuses
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Replaces the retryable status codes from comma-separated text.
    ///
    /// Tokens that are not integers are dropped; order is preserved.
    pub fn set_retry_statuses_text(&mut self, text: &str) {
        let statuses = text
            .split(',')
            .filter_map(|token| token.trim().parse::<i64>().ok())
            .collect();
        self.retry_statuses = Some(statuses);
        self.extra.remove("retry_statuses");
    }
}

fn merge_retry_policy(
    current: Option<RetryPolicy>,
    field: PairField,
    value: Option<Number>,
) -> Option<RetryPolicy> {
    let pair = current.map(|policy| (policy.max_attempts, policy.backoff_seconds));
    merge_pair(pair, field, value, (None, Some(Number::from(1u64)))).map(
        |(max_attempts, backoff_seconds)| RetryPolicy {
            max_attempts,
            backoff_seconds,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn config_round_trips_known_and_unknown_keys() {
        let doc = json!({
            "api_port": 5787,
            "timeout_seconds": 12.5,
            "register_commands": true,
            "retry": {"max_attempts": 3, "backoff_seconds": 1},
            "retry_statuses": [500, 502, 503, 429],
            "log_level": "debug"
        });
        let form = ConfigResource::from_api(&doc).expect("decode");
        assert_eq!(form.extra.get("log_level"), Some(&json!("debug")));
        assert_eq!(ConfigResource::to_api(&form).expect("encode"), doc);
    }

    #[test]
    fn empty_config_stays_empty() {
        let form = ConfigResource::from_api(&json!({})).expect("decode");
        assert_eq!(form.api_port_or_default(), DEFAULT_API_PORT);
        assert_eq!(form.timeout_seconds_or_default(), 30.0);
        assert_eq!(form.retry_statuses_or_default(), vec![500, 502, 503, 429]);
        assert_eq!(ConfigResource::to_api(&form).expect("encode"), json!({}));
    }

    #[test]
    fn config_rejects_non_object() {
        let err = ConfigResource::from_api(&json!([1, 2])).expect_err("array");
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "config"));
    }

    #[test]
    fn empty_retry_object_is_elided() {
        let form = ConfigResource::from_api(&json!({"retry": {}})).expect("decode");
        assert_eq!(ConfigResource::to_api(&form).expect("encode"), json!({}));
    }

    #[test]
    fn retry_statuses_text_drops_invalid_tokens() {
        let mut form = ConfigForm::default();
        form.set_retry_statuses_text("500, 502,abc, ,429");
        assert_eq!(form.retry_statuses, Some(vec![500, 502, 429]));
        assert_eq!(form.retry_statuses_text(), "500,502,429");
    }

    #[test]
    fn api_port_must_fit_port_range() {
        let mut form = ConfigForm::default();
        form.set_api_port_text("8080").expect("port");
        assert_eq!(form.api_port_or_default(), 8080);
        assert!(form.set_api_port_text("70000").is_err());
        assert!(form.set_api_port_text("0").is_err());
        assert_eq!(form.api_port_or_default(), 8080);
        form.set_api_port_text("").expect("clear");
        assert_eq!(form.api_port, None);
    }

    #[test]
    fn global_retry_follows_merge_rule() {
        let mut form = ConfigForm::default();
        form.set_retry_max_attempts(Some(2u64.into()));
        assert_eq!(
            ConfigResource::to_api(&form).expect("encode"),
            json!({"retry": {"max_attempts": 2, "backoff_seconds": 1}})
        );
        form.set_retry_backoff_seconds(None);
        form.set_retry_max_attempts(None);
        assert_eq!(ConfigResource::to_api(&form).expect("encode"), json!({}));
    }

    #[test]
    fn mistyped_values_round_trip_as_stored() {
        let doc = json!({
            "api_port": "5787",
            "retry_statuses": [500.0, 502],
            "retry": false,
            "register_commands": null
        });
        let form = ConfigResource::from_api(&doc).expect("decode");
        assert_eq!(form.retry_statuses, None);
        assert_eq!(form.api_port_or_default(), DEFAULT_API_PORT);
        assert_eq!(form.retry_statuses_or_default(), DEFAULT_RETRY_STATUSES.to_vec());
        assert_eq!(ConfigResource::to_api(&form).expect("encode"), doc);
    }

    #[test]
    fn editing_a_held_value_replaces_it() {
        let mut form =
            ConfigResource::from_api(&json!({"retry_statuses": [500.0, 502]})).expect("decode");
        form.set_retry_statuses_text("503");
        assert_eq!(
            ConfigResource::to_api(&form).expect("encode"),
            json!({"retry_statuses": [503]})
        );
    }
}
