//! Login through bot lifecycle, end to end against a mock server.

mod common;

use common::{admin, Harness};
use serde_json::json;
use std::time::Duration;
use tgadmin_api::Credentials;
use tgadmin_core::{BotId, BotStatus, Severity};
use tgadmin_dashboard::views::{BotAction, BotManagementView, DashboardView};
use tgadmin_dashboard::{attach_realtime, DashboardError, Route};
use tgadmin_realtime::{Event, RealtimeClient, RealtimeConfig, Topic};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

async fn mount_backend(h: &Harness) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"username": "admin", "password": "secret"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"token": "jwt-9", "user": admin()})),
        )
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/analytics/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_users": 40,
            "total_messages": 900,
            "active_bots": 0,
            "total_bots": 0,
            "metrics_by_bot": {}
        })))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/advertisements"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/bots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/bots"))
        .and(body_json(json!({"bot_token": "123:abc", "bot_name": "Bot1"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "bot": {"id": 1, "bot_name": "Bot1", "status": "stopped"}
        })))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/bots/1/start"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": "Bot started successfully"}))
                .set_delay(Duration::from_millis(150)),
        )
        .expect(1)
        .mount(&h.server)
        .await;
    // The bot has not come up yet when the status is re-fetched.
    Mock::given(method("GET"))
        .and(path("/api/bots/1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "stopped"})))
        .mount(&h.server)
        .await;
}

#[tokio::test]
async fn test_login_add_and_start_bot() {
    let h = Harness::start().await;
    mount_backend(&h).await;

    assert_eq!(h.ctx.navigator().navigate(Route::Dashboard), Route::Login);

    h.ctx
        .session()
        .login(&Credentials::new("admin", "secret"))
        .await
        .unwrap();
    assert_eq!(h.stored_token().as_deref(), Some("jwt-9"));
    assert_eq!(h.ctx.navigator().refresh(), Route::Dashboard);

    let dashboard = DashboardView::new(h.ctx.clone());
    let summary = dashboard.load().await;
    assert_eq!(summary.value().map(|s| s.total_messages), Some(900));

    let bots = BotManagementView::new(h.ctx.clone());
    bots.load().await;
    let bot = bots.add_bot("Bot1", "123:abc").await.unwrap();
    assert_eq!(bots.bots().len(), 1);
    assert_eq!(bot.status, BotStatus::Stopped);
    assert!(bots.is_action_enabled(bot.id, BotAction::Start));

    let (result, (pending, start_enabled)) = tokio::join!(bots.start(bot.id), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        (
            bots.is_pending(bot.id),
            bots.is_action_enabled(bot.id, BotAction::Start),
        )
    });
    result.unwrap();
    assert!(pending);
    assert!(!start_enabled);

    // Still stopped on the re-fetch, so the action stays pending.
    assert_eq!(bots.pending_action(bot.id), Some(BotAction::Start));
    assert!(matches!(
        bots.start(bot.id).await,
        Err(DashboardError::Busy(_))
    ));

    // A real-time status change settles it.
    let realtime = RealtimeClient::new(RealtimeConfig::default());
    let _follow = bots.follow(&realtime);
    realtime.registry().dispatch(&Event::new(
        Topic::BotStatusChange,
        json!({"bot_id": 1, "status": "running", "bot_name": "Bot1"}),
    ));
    assert!(!bots.is_pending(bot.id));
    assert_eq!(bots.bot(BotId(1)).unwrap().status, BotStatus::Running);
    assert!(bots.is_action_enabled(bot.id, BotAction::Stop));
    assert!(h
        .messages()
        .contains(&"Bot started successfully".to_string()));
}

#[tokio::test]
async fn test_realtime_events_become_notifications() {
    let h = Harness::start().await;
    let realtime = RealtimeClient::new(RealtimeConfig::default());
    let bridge = attach_realtime(&realtime, h.ctx.notifications().clone());

    realtime.registry().dispatch(&Event::new(
        Topic::BotStatusChange,
        json!({"bot_id": 4, "status": "error"}),
    ));
    realtime.registry().dispatch(&Event::new(
        Topic::BroadcastStatusChange,
        json!({"ad_id": 2, "status": "failed", "title": "Spring sale"}),
    ));

    let shown = h.ctx.notifications().active();
    assert_eq!(shown.len(), 2);
    assert_eq!(shown[0].message, "Bot #4 is now error");
    assert_eq!(shown[1].message, "Broadcast failed: Spring sale");
    assert_eq!(shown[1].severity, Severity::Error);

    bridge.detach();
    realtime
        .registry()
        .dispatch(&Event::error("connection dropped"));
    assert_eq!(h.ctx.notifications().active().len(), 2);
}
