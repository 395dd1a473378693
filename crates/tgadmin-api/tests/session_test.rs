//! Session lifecycle tests against a mock HTTP server.

use serde_json::json;
use std::sync::Arc;
use tgadmin_api::{
    ApiClient, ApiConfig, Credentials, FileTokenStore, Session, SessionState, TokenStore,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session(server: &MockServer, store: Arc<FileTokenStore>) -> Session {
    let api = ApiClient::new(ApiConfig::with_base_url(format!("{}/api", server.uri())), store)
        .unwrap();
    Session::new(api)
}

fn login_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "token": "jwt-1",
        "user": {"id": 1, "username": "admin", "email": "admin@example.com", "role": "admin"}
    }))
}

#[tokio::test]
async fn test_login_persists_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"username": "admin", "password": "secret"})))
        .respond_with(login_ok())
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileTokenStore::new(dir.path().join("token")));
    let session = session(&server, store.clone());
    let mut rx = session.subscribe();

    let user = session
        .login(&Credentials::new("admin", "secret"))
        .await
        .unwrap();
    assert_eq!(user.username, "admin");
    assert!(session.is_authenticated());
    assert!(rx.has_changed().unwrap());
    assert!(matches!(&*rx.borrow_and_update(), SessionState::Authenticated(u) if u.username == "admin"));

    // A fresh store over the same file sees the token.
    let reopened = FileTokenStore::new(store.path());
    assert_eq!(reopened.load().unwrap().as_deref(), Some("jwt-1"));
}

#[tokio::test]
async fn test_login_failure_leaves_state_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "User not found!"})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileTokenStore::new(dir.path().join("token")));
    let session = session(&server, store.clone());

    let err = session
        .login(&Credentials::new("ghost", "pw"))
        .await
        .unwrap_err();
    assert_eq!(err.user_message("Login failed"), "User not found!");
    assert_eq!(session.state(), SessionState::Unauthenticated);
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn test_restore_validates_stored_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("x-access-token", "jwt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"username": "admin"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileTokenStore::new(dir.path().join("token")));
    store.save("jwt-1").unwrap();

    let session = session(&server, store);
    let user = session.restore().await.unwrap().unwrap();
    assert_eq!(user.username, "admin");
    assert!(!session.is_loading());
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn test_restore_with_rejected_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Token is invalid!"})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileTokenStore::new(dir.path().join("token")));
    store.save("expired").unwrap();

    let session = session(&server, store.clone());
    assert!(session.restore().await.unwrap().is_none());
    assert_eq!(session.state(), SessionState::Unauthenticated);
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn test_restore_keeps_token_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileTokenStore::new(dir.path().join("token")));
    store.save("jwt-1").unwrap();

    let session = session(&server, store.clone());
    assert!(session.restore().await.is_err());
    assert_eq!(session.state(), SessionState::Unauthenticated);
    assert_eq!(store.load().unwrap().as_deref(), Some("jwt-1"));
}

#[tokio::test]
async fn test_register_then_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"message": "User registered successfully!"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(login_ok())
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileTokenStore::new(dir.path().join("token")));
    let session = session(&server, store.clone());

    let user = session
        .register(&Credentials::new("admin", "secret"))
        .await
        .unwrap();
    assert_eq!(user.username, "admin");
    assert_eq!(store.load().unwrap().as_deref(), Some("jwt-1"));
}

#[tokio::test]
async fn test_logout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(login_ok())
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileTokenStore::new(dir.path().join("token")));
    let session = session(&server, store.clone());
    session
        .login(&Credentials::new("admin", "secret"))
        .await
        .unwrap();

    session.logout().unwrap();
    assert_eq!(session.state(), SessionState::Unauthenticated);
    assert!(store.load().unwrap().is_none());
}
