use std::time::Duration;

pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5787/api";
/// Environment variable read by [`crate::ConsoleClientBuilder::from_env`].
pub const BASE_URL_ENV: &str = "CONFIG_API_URL";
/// Header carrying the session credential.
pub const DEFAULT_CREDENTIAL_HEADER: &str = "X-Config-Password";
