use config_console::{ConsoleClient, CredentialStore, Error, ResourceKind};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

mod common;
use common::{captured, json_response, ok_ack, response_with_body, serve_once, PASSWORD};

fn client_for(base_url: &str, store: &Arc<CredentialStore>) -> ConsoleClient {
    ConsoleClient::builder(base_url)
        .expect("builder")
        .credential_store(Arc::clone(store))
        .build()
        .expect("build")
}

#[tokio::test]
async fn fetch_attaches_credential_header() {
    let (base_url, rx) = serve_once(json_response("200 OK", r#"[{"id":"weather"}]"#)).await;
    let store = Arc::new(CredentialStore::with_credential(PASSWORD));
    let client = client_for(&base_url, &store);

    let apis = client.get_apis().await.expect("apis");
    assert_eq!(apis, vec![json!({"id": "weather"})]);

    let req = captured(rx).await;
    assert_eq!(req.method, "GET");
    assert_eq!(req.path, "/api/apis");
    assert_eq!(req.header_value("X-Config-Password"), Some(PASSWORD));
}

#[tokio::test]
async fn custom_credential_header_is_used() {
    let (base_url, rx) = serve_once(json_response("200 OK", "{}")).await;
    let client = ConsoleClient::builder(format!("{base_url}/"))
        .expect("builder")
        .credential_header("X-Admin-Token")
        .credential_store(Arc::new(CredentialStore::with_credential("tok")))
        .build()
        .expect("build");

    client.get_groups().await.expect("groups");

    let req = captured(rx).await;
    assert_eq!(req.path, "/api/groups");
    assert_eq!(req.header_value("X-Admin-Token"), Some("tok"));
    assert_eq!(req.header_value("X-Config-Password"), None);
}

#[tokio::test]
async fn unauthorized_clears_credential_and_runs_hook() {
    // The body is deliberately not JSON: it must never be decoded.
    let (base_url, rx) = serve_once(response_with_body(
        "401 Unauthorized",
        &[("Content-Type", "text/plain")],
        "nope",
    ))
    .await;
    let store = Arc::new(CredentialStore::with_credential("stale"));
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let client = ConsoleClient::builder(&base_url)
        .expect("builder")
        .credential_store(Arc::clone(&store))
        .on_unauthorized(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .expect("build");

    let err = client.fetch(ResourceKind::Config).await.expect_err("401");
    assert!(matches!(err, Error::Unauthorized));
    assert_eq!(err.user_message(), "Unauthorized");
    assert!(!store.is_present());
    assert!(!client.is_authenticated());
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let req = captured(rx).await;
    assert_eq!(req.header_value("X-Config-Password"), Some("stale"));
}

#[tokio::test]
async fn error_detail_is_surfaced() {
    let (base_url, _rx) = serve_once(json_response(
        "400 Bad Request",
        r#"{"detail":"Body must be {\"apis\": [...]}"}"#,
    ))
    .await;
    let store = Arc::new(CredentialStore::with_credential(PASSWORD));
    let client = client_for(&base_url, &store);

    let err = client.put_apis(vec![]).await.expect_err("400");
    match err {
        Error::Request(failure) => {
            assert_eq!(failure.status, 400);
            assert_eq!(failure.message, r#"Body must be {"apis": [...]}"#);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(store.is_present());
}

#[tokio::test]
async fn error_without_detail_uses_status_text() {
    let (base_url, _rx) = serve_once(response_with_body(
        "503 Service Unavailable",
        &[("Content-Type", "text/html")],
        "<html>down</html>",
    ))
    .await;
    let store = Arc::new(CredentialStore::with_credential(PASSWORD));
    let client = client_for(&base_url, &store);

    let err = client.get_schedules().await.expect_err("503");
    assert_eq!(err.user_message(), "Service Unavailable");
}

#[tokio::test]
async fn put_apis_sends_envelope() {
    let (base_url, rx) = serve_once(ok_ack()).await;
    let store = Arc::new(CredentialStore::with_credential(PASSWORD));
    let client = client_for(&base_url, &store);

    let ack = client
        .put_apis(vec![json!({"id": "a"}), json!({"id": "b"})])
        .await
        .expect("put");
    assert!(ack.is_ok());

    let req = captured(rx).await;
    assert_eq!(req.method, "PUT");
    assert_eq!(req.path, "/api/apis");
    assert_eq!(
        req.header_value("Content-Type"),
        Some("application/json")
    );
    assert_eq!(req.json_body(), json!({"apis": [{"id": "a"}, {"id": "b"}]}));
}

#[tokio::test]
async fn put_schedules_sends_envelope() {
    let (base_url, rx) = serve_once(ok_ack()).await;
    let store = Arc::new(CredentialStore::with_credential(PASSWORD));
    let client = client_for(&base_url, &store);

    client.put_schedules(vec![]).await.expect("put");

    let req = captured(rx).await;
    assert_eq!(req.path, "/api/schedules");
    assert_eq!(req.json_body(), json!({"schedules": []}));
}

#[tokio::test]
async fn put_auth_sends_document_as_is() {
    let (base_url, rx) = serve_once(ok_ack()).await;
    let store = Arc::new(CredentialStore::with_credential(PASSWORD));
    let client = client_for(&base_url, &store);
    let doc = json!({"github": {"type": "bearer", "token": "ghp"}});

    client
        .put_auth(doc.as_object().cloned().expect("object"))
        .await
        .expect("put");

    let req = captured(rx).await;
    assert_eq!(req.path, "/api/auth");
    assert_eq!(req.json_body(), doc);
}

#[tokio::test]
async fn unexpected_document_shape_is_a_validation_error() {
    let (base_url, _rx) = serve_once(json_response("200 OK", r#"{"apis":[]}"#)).await;
    let store = Arc::new(CredentialStore::with_credential(PASSWORD));
    let client = client_for(&base_url, &store);

    let err = client.get_apis().await.expect_err("shape");
    assert!(matches!(err, Error::Validation { ref field, .. } if field == "apis"));
}

#[tokio::test]
async fn missing_credential_is_refused_locally() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let client = ConsoleClient::builder("http://127.0.0.1:9/api")
        .expect("builder")
        .on_unauthorized(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .expect("build");

    for kind in ResourceKind::ALL {
        let err = client.fetch(kind).await.expect_err("gate");
        assert!(err.is_unauthorized());
    }
    assert_eq!(hits.load(Ordering::SeqCst), ResourceKind::ALL.len());
}

#[tokio::test]
async fn login_trims_and_validates_with_config_fetch() {
    let (base_url, rx) = serve_once(json_response("200 OK", r#"{"api_port":5787}"#)).await;
    let store = Arc::new(CredentialStore::new());
    let client = client_for(&base_url, &store);

    let config = client.login("  s3cret \n").await.expect("login");
    assert_eq!(config, json!({"api_port": 5787}));
    assert_eq!(store.get().as_deref(), Some(PASSWORD));

    let req = captured(rx).await;
    assert_eq!(req.path, "/api/config");
    assert_eq!(req.header_value("X-Config-Password"), Some(PASSWORD));
}

#[tokio::test]
async fn rejected_login_leaves_no_credential() {
    let (base_url, _rx) = serve_once(json_response(
        "401 Unauthorized",
        r#"{"detail":"Invalid password"}"#,
    ))
    .await;
    let store = Arc::new(CredentialStore::new());
    let client = client_for(&base_url, &store);

    let err = client.login("wrong").await.expect_err("401");
    assert!(err.is_unauthorized());
    assert!(!client.is_authenticated());
}
