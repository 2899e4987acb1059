//! Shared utilities for integration testing.

use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;
use user_service::config::ServiceConfig;
use user_service::lifecycle::{self, App, Shutdown};

/// Config for a test instance: ephemeral port, database under `dir`, fast ticks.
pub fn test_config(dir: &Path) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.database.url = format!("sqlite://{}", dir.join("users.db").display());
    config.health_check.name = "test-db".to_string();
    config.health_check.interval_ms = Some(50);
    config.health_check.probe_timeout_secs = 2;
    config
}

/// Start the whole service.
pub async fn start_app(config: ServiceConfig) -> (Shutdown, App) {
    let shutdown = Shutdown::new();
    let app = lifecycle::start(config, &shutdown).await.unwrap();
    (shutdown, app)
}

pub fn base_url(app: &App) -> String {
    format!("http://{}", app.local_addr())
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Poll `check` until it returns true or five seconds pass.
#[allow(dead_code)]
pub async fn eventually<F, Fut>(what: &str, mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("timed out waiting for {what}");
}

/// Register a user and return its id.
#[allow(dead_code)]
pub async fn register(client: &reqwest::Client, base: &str, username: &str) -> i64 {
    let res = client
        .post(format!("{base}/api/v1/users"))
        .json(&serde_json::json!({ "username": username, "password": "pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    let body: serde_json::Value = res.json().await.unwrap();
    body["id"].as_i64().unwrap()
}
