use crate::build_url::build_url;
use crate::client_defaults::{
    BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_CREDENTIAL_HEADER, DEFAULT_TIMEOUT,
};
use crate::credential::CredentialStore;
use crate::error::{parse_error_from_body, read_body_with_limit_async, Error, MAX_ERROR_BODY_BYTES};
use crate::models::{Ack, ResourceKind};
use log::{debug, warn};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Client as HttpClient, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

mod resources;

const CONFIG_ERROR_REDIRECT_WITH_CREDENTIAL: &str =
    "config error: redirects cannot be followed while a credential header is attached";

/// Called after an unauthorized outcome has cleared the credential.
///
/// The embedding application uses it to return to its login entry point.
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// Builder for [`ConsoleClient`].
///
/// `base_url` should point to the API root of the config service (e.g.,
/// `http://localhost:5787/api`). Trailing slashes are allowed. Redirects
/// are never followed because every request may carry the credential.
pub struct ConsoleClientBuilder {
    base_url: Url,
    timeout: Option<Duration>,
    disable_redirect: bool,
    credential_header: String,
    credentials: Option<Arc<CredentialStore>>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl ConsoleClientBuilder {
    /// Create a new client builder.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, Error> {
        Ok(Self {
            base_url: Url::parse(base_url.as_ref())?,
            timeout: Some(DEFAULT_TIMEOUT),
            disable_redirect: true,
            credential_header: DEFAULT_CREDENTIAL_HEADER.to_string(),
            credentials: None,
            on_unauthorized: None,
        })
    }

    /// Create a builder from `CONFIG_API_URL`, falling back to
    /// [`DEFAULT_BASE_URL`] when it is unset or blank.
    pub fn from_env() -> Result<Self, Error> {
        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    /// Sets the request timeout for the underlying HTTP client.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Header that carries the credential. Validated by [`Self::build`].
    pub fn credential_header(mut self, header: impl Into<String>) -> Self {
        self.credential_header = header.into();
        self
    }

    /// Shares an existing credential store with the client.
    pub fn credential_store(mut self, credentials: Arc<CredentialStore>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Control whether HTTP redirects should be followed.
    ///
    /// Enabling redirects is rejected at build time.
    pub fn follow_redirects(mut self, follow_redirects: bool) -> Self {
        self.disable_redirect = !follow_redirects;
        self
    }

    /// Registers the hook run whenever the credential is rejected or missing.
    pub fn on_unauthorized<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_unauthorized = Some(Arc::new(hook));
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ConsoleClient, Error> {
        if !self.disable_redirect {
            return Err(Error::Config(CONFIG_ERROR_REDIRECT_WITH_CREDENTIAL.to_string()));
        }
        let credential_header = HeaderName::from_bytes(self.credential_header.as_bytes())
            .map_err(|e| Error::Config(format!("invalid credential header name: {e}")))?;
        let mut builder = HttpClient::builder().redirect(reqwest::redirect::Policy::none());
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(ConsoleClient {
            base_url: self.base_url,
            http,
            credential_header,
            credentials: self.credentials.unwrap_or_default(),
            on_unauthorized: self.on_unauthorized,
        })
    }
}

/// Async client for the five configuration resources.
///
/// Every request carries the current credential. A missing credential fails
/// locally with [`Error::Unauthorized`]; a rejected one is cleared from the
/// store before the same error is returned. In both cases the unauthorized
/// hook runs and no response body is decoded.
pub struct ConsoleClient {
    base_url: Url,
    http: HttpClient,
    credential_header: HeaderName,
    credentials: Arc<CredentialStore>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl ConsoleClient {
    /// Returns a builder for a client.
    pub fn builder(base_url: impl AsRef<str>) -> Result<ConsoleClientBuilder, Error> {
        ConsoleClientBuilder::new(base_url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The store holding the session credential.
    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_present()
    }

    /// Stores `password` as the session credential and validates it by
    /// fetching `config`, which is returned on success.
    ///
    /// Surrounding whitespace is trimmed. A blank password is rejected
    /// without touching the store or the network. A rejected password has
    /// already been cleared when `Unauthorized` is returned.
    pub async fn login(&self, password: &str) -> Result<Value, Error> {
        let password = password.trim();
        if password.is_empty() {
            return Err(Error::validation("password", "must not be empty"));
        }
        credential_value(password)?;
        self.credentials.set(password);
        self.fetch(ResourceKind::Config).await
    }

    /// Forgets the session credential.
    pub fn logout(&self) {
        self.credentials.clear();
    }

    /// Retrieves the canonical document of `kind`.
    pub async fn fetch(&self, kind: ResourceKind) -> Result<Value, Error> {
        let resp = self.send(Method::GET, kind, None).await?;
        self.expect_ok_json(resp).await
    }

    /// Replaces the whole document of `kind`.
    ///
    /// `document` is the canonical shape returned by [`Self::fetch`]; list
    /// resources are wrapped into their envelope here.
    pub async fn replace(&self, kind: ResourceKind, document: Value) -> Result<Ack, Error> {
        let body = kind.envelope(document);
        let resp = self.send(Method::PUT, kind, Some(&body)).await?;
        self.expect_ok_json(resp).await
    }

    async fn send(
        &self,
        method: Method,
        kind: ResourceKind,
        body: Option<&Value>,
    ) -> Result<Response, Error> {
        let Some(credential) = self.credentials.get() else {
            debug!("{method} {kind} refused: no credential");
            return Err(self.reject_unauthorized());
        };
        let credential = credential_value(&credential)?;
        let url = build_url(&self.base_url, &[kind.as_str()])?;
        debug!("{method} {kind}");
        let mut req = self
            .http
            .request(method, url)
            .header(self.credential_header.clone(), credential);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;
        if resp.status() == StatusCode::UNAUTHORIZED {
            warn!("{kind}: credential rejected, clearing session");
            return Err(self.reject_unauthorized());
        }
        Ok(resp)
    }

    fn reject_unauthorized(&self) -> Error {
        self.credentials.clear();
        if let Some(hook) = &self.on_unauthorized {
            hook();
        }
        Error::Unauthorized
    }

    async fn expect_ok_json<T: DeserializeOwned>(&self, resp: Response) -> Result<T, Error> {
        if resp.status().is_success() {
            let body = resp.bytes().await?;
            serde_json::from_slice(&body).map_err(Error::from)
        } else {
            self.parse_error(resp).await
        }
    }

    async fn parse_error<T>(&self, mut resp: Response) -> Result<T, Error> {
        let status = resp.status();
        let body = read_body_with_limit_async(&mut resp, MAX_ERROR_BODY_BYTES).await?;
        Err(parse_error_from_body(status, &body))
    }
}

fn credential_value(credential: &str) -> Result<HeaderValue, Error> {
    let mut value = HeaderValue::from_str(credential).map_err(|_| {
        Error::validation("password", "contains characters not allowed in a header")
    })?;
    value.set_sensitive(true);
    Ok(value)
}

impl fmt::Debug for ConsoleClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleClient")
            .field("base_url", &self.base_url.as_str())
            .field("credential_header", &self.credential_header)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_redirects() {
        let err = ConsoleClient::builder(DEFAULT_BASE_URL)
            .expect("builder")
            .follow_redirects(true)
            .build()
            .expect_err("redirects");
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn builder_rejects_invalid_header_name() {
        let err = ConsoleClient::builder(DEFAULT_BASE_URL)
            .expect("builder")
            .credential_header("bad header")
            .build()
            .expect_err("header");
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn builder_rejects_unparseable_base_url() {
        assert!(matches!(
            ConsoleClient::builder("not a url"),
            Err(Error::Url(_))
        ));
    }

    #[test]
    fn shared_store_is_used() {
        let store = Arc::new(CredentialStore::with_credential("pw"));
        let client = ConsoleClient::builder(DEFAULT_BASE_URL)
            .expect("builder")
            .credential_store(Arc::clone(&store))
            .build()
            .expect("build");
        assert!(client.is_authenticated());
        client.logout();
        assert!(!store.is_present());
        store.set("hunter2");
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[tokio::test]
    async fn missing_credential_fails_without_network() {
        let hits = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let client = ConsoleClient::builder("http://127.0.0.1:9/api")
            .expect("builder")
            .on_unauthorized(move || {
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            })
            .build()
            .expect("build");
        let err = client.fetch(ResourceKind::Apis).await.expect_err("gate");
        assert!(err.is_unauthorized());
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn blank_login_touches_nothing() {
        let client = ConsoleClient::builder(DEFAULT_BASE_URL)
            .expect("builder")
            .build()
            .expect("build");
        let err = client.login("   ").await.expect_err("blank");
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "password"));
        assert!(!client.is_authenticated());
    }
}
