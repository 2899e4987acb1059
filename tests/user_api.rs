//! HTTP API tests against a running service.

use serde_json::{json, Value};

mod common;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_user_crud_flow() {
    let dir = tempfile::tempdir().unwrap();
    let (shutdown, app) = common::start_app(common::test_config(dir.path())).await;
    let client = common::client();
    let base = common::base_url(&app);

    let id = common::register(&client, &base, "alice").await;

    let res = client
        .get(format!("{base}/api/v1/users?username=alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let user: Value = res.json().await.unwrap();
    assert_eq!(user["id"], id);
    assert!(user.get("password").is_none());

    let res = client
        .put(format!("{base}/api/v1/users/{id}"))
        .json(&json!({ "email": "alice@example.com", "birthdate": "02/03/1991" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["email"], "alice@example.com");
    assert!(updated["updated_at"].is_string());

    // trailing slash is tolerated
    let res = client
        .get(format!("{base}/api/v1/users/{id}/"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let fetched: Value = res.json().await.unwrap();
    assert_eq!(fetched["birthdate"], "02/03/1991");

    let res = client
        .delete(format!("{base}/api/v1/users/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 204);

    let res = client
        .get(format!("{base}/api/v1/users/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], 404);
    assert_eq!(body["message"], "User not found");
    assert!(body["timestamp"].is_string());

    shutdown.trigger();
    app.wait().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_validation_errors() {
    let dir = tempfile::tempdir().unwrap();
    let (shutdown, app) = common::start_app(common::test_config(dir.path())).await;
    let client = common::client();
    let base = common::base_url(&app);

    let res = client
        .post(format!("{base}/api/v1/users"))
        .json(&json!({ "username": "bob" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Invalid username or password");

    let res = client
        .get(format!("{base}/api/v1/users?username="))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Username is required");

    let res = client
        .get(format!("{base}/api/v1/users/abc"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let res = client
        .put(format!("{base}/api/v1/users/999"))
        .json(&json!({ "email": "x@y.z" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    let res = client
        .post(format!("{base}/api/v1/users"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    shutdown.trigger();
    app.wait().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_request_id_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let (shutdown, app) = common::start_app(common::test_config(dir.path())).await;
    let client = common::client();
    let base = common::base_url(&app);

    let res = client
        .get(format!("{base}/health"))
        .header("x-request-id", "req-123")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "req-123");

    let res = client.get(format!("{base}/health")).send().await.unwrap();
    assert!(res.headers().contains_key("x-request-id"));

    shutdown.trigger();
    app.wait().await.unwrap();
}
