//! Shared fixtures for dashboard integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Arc;
use tgadmin_api::{ApiClient, ApiConfig, MemoryTokenStore, Session, TokenStore};
use tgadmin_dashboard::{NotificationCenter, ViewContext};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct Harness {
    pub server: MockServer,
    pub tokens: Arc<MemoryTokenStore>,
    pub ctx: ViewContext,
}

impl Harness {
    /// Unauthenticated context pointed at a fresh mock server.
    pub async fn start() -> Self {
        Self::with_store(MemoryTokenStore::new()).await
    }

    /// Context whose session was restored from a stored token.
    pub async fn signed_in() -> Self {
        let harness = Self::with_store(MemoryTokenStore::with_token("jwt-1")).await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": admin()})))
            .mount(&harness.server)
            .await;
        harness
            .ctx
            .session()
            .restore()
            .await
            .unwrap()
            .expect("token accepted");
        harness
    }

    async fn with_store(store: MemoryTokenStore) -> Self {
        let server = MockServer::start().await;
        let tokens = Arc::new(store);
        let api = ApiClient::new(
            ApiConfig::with_base_url(format!("{}/api", server.uri())),
            tokens.clone(),
        )
        .unwrap();
        let ctx = ViewContext::new(Session::new(api), NotificationCenter::default());
        Self {
            server,
            tokens,
            ctx,
        }
    }

    pub fn stored_token(&self) -> Option<String> {
        self.tokens.load().unwrap()
    }

    /// Messages of the notifications currently shown.
    pub fn messages(&self) -> Vec<String> {
        self.ctx
            .notifications()
            .active()
            .into_iter()
            .map(|n| n.message)
            .collect()
    }
}

pub fn admin() -> Value {
    json!({"id": 1, "username": "admin", "email": "admin@example.com", "role": "admin"})
}

pub fn advertisement(id: u64, targets: &[u64]) -> Value {
    json!({
        "id": id,
        "title": format!("Ad {id}"),
        "content": "Limited offer",
        "price": 9.99,
        "target_bots": targets,
        "status": "pending"
    })
}
