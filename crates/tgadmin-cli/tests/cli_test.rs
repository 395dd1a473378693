//! Command runs against a mock REST server.

use serde_json::json;
use tgadmin_cli::cli::{AdsCommand, BotsCommand, CredentialArgs, ProfileCommand};
use tgadmin_cli::{AppConfig, AppError, Application, Command};
use tgadmin_dashboard::Route;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Fixture {
    server: MockServer,
    dir: tempfile::TempDir,
    app: Application,
}

async fn fixture() -> Fixture {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.api.base_url = format!("{}/api", server.uri());
    config.session.token_path = dir.path().join("token");
    let app = Application::new(config).unwrap();
    Fixture { server, dir, app }
}

fn user() -> serde_json::Value {
    json!({"id": 1, "username": "admin", "role": "admin"})
}

#[tokio::test]
async fn test_private_command_requires_login() {
    let f = fixture().await;
    Mock::given(method("GET"))
        .and(path("/api/bots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&f.server)
        .await;

    let err = f
        .app
        .run(Command::Bots(BotsCommand::List {
            search: None,
            status: None,
        }))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotAuthenticated));
    assert_eq!(f.app.ctx().navigator().current(), Route::Login);
}

#[tokio::test]
async fn test_login_then_private_command() {
    let f = fixture().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"token": "jwt-5", "user": user()})),
        )
        .mount(&f.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("x-access-token", "jwt-5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": user()})))
        .mount(&f.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/advertisements"))
        .and(header("x-access-token", "jwt-5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&f.server)
        .await;

    f.app
        .run(Command::Login(CredentialArgs {
            username: "admin".into(),
            password: Some("secret".into()),
        }))
        .await
        .unwrap();
    assert_eq!(
        std::fs::read_to_string(f.dir.path().join("token")).unwrap().trim(),
        "jwt-5"
    );

    f.app.run(Command::Ads(AdsCommand::List)).await.unwrap();
    assert_eq!(f.app.ctx().navigator().current(), Route::Advertising);
}

#[tokio::test]
async fn test_expired_token_is_cleared() {
    let f = fixture().await;
    std::fs::write(f.dir.path().join("token"), "stale").unwrap();
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&f.server)
        .await;

    let err = f
        .app
        .run(Command::Profile(ProfileCommand::Keys))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotAuthenticated));
    assert!(f.app.ctx().session().token().unwrap().is_none());
}

#[tokio::test]
async fn test_failed_action_is_reported_once() {
    let f = fixture().await;
    std::fs::write(f.dir.path().join("token"), "jwt-5").unwrap();
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user()))
        .mount(&f.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/bots"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "Invalid bot token"})),
        )
        .mount(&f.server)
        .await;

    let err = f
        .app
        .run(Command::Bots(BotsCommand::Add {
            name: "Bot1".into(),
            token: "bad".into(),
        }))
        .await
        .unwrap_err();
    assert!(err.is_reported());
    let shown = f.app.ctx().notifications().active();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].message, "Invalid bot token");

    f.app.flush_notifications();
    assert!(f.app.ctx().notifications().active().is_empty());
}

#[test]
fn test_config_file_and_env_override() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("tgadmin.toml");
    std::fs::write(
        &file,
        "[api]\nbase_url = \"https://admin.example.com/api\"\n\n[media]\nmax_files = 2\n",
    )
    .unwrap();
    std::env::set_var("TGADMIN__REALTIME__MAX_RECONNECT_ATTEMPTS", "4");

    let config = AppConfig::load(Some(&file)).unwrap();
    assert_eq!(config.api.base_url, "https://admin.example.com/api");
    assert_eq!(config.media.max_files, 2);
    assert_eq!(config.realtime.max_reconnect_attempts, 4);

    let missing = AppConfig::load(Some(&dir.path().join("absent.toml")));
    assert!(matches!(missing, Err(AppError::Config(_))));
}
