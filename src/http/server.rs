//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, metrics, timeout)
//! - Tolerate trailing slashes
//! - Bind server to listener and drain on shutdown

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router, ServiceExt,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::{Layer, ServiceBuilder};
use tower_http::{
    normalize_path::NormalizePathLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::db::{ConnectionHandle, UserRepository};
use crate::health::{HealthState, HealthStatus};
use crate::http::request::{request_id, UuidRequestId};
use crate::http::users;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: UserRepository,
    pub health: Arc<HealthStatus>,
    pub check_name: Arc<str>,
}

/// HTTP server for the user service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    handle: ConnectionHandle,
}

impl HttpServer {
    /// Create a new HTTP server reading through `handle` and reporting `health`.
    pub fn new(config: ServiceConfig, handle: ConnectionHandle, health: Arc<HealthStatus>) -> Self {
        let state = AppState {
            users: UserRepository::new(handle.clone()),
            health,
            check_name: Arc::from(config.health_check.name.as_str()),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            handle,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let api = Router::new()
            .route(
                "/users",
                get(users::find_by_username).post(users::register),
            )
            .route(
                "/users/{id}",
                get(users::find_by_id)
                    .put(users::update)
                    .delete(users::delete),
            );

        Router::new()
            .nest("/api/v1", api)
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http().make_span_with(|req: &Request| {
                        tracing::info_span!(
                            "request",
                            method = %req.method(),
                            path = %req.uri().path(),
                            request_id = %request_id(req.headers()),
                        )
                    }))
                    .layer(middleware::from_fn(track_metrics))
                    .layer(request_timeout(config))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The router without trailing-slash normalisation, for in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` is cancelled, then drain in-flight requests.
    pub async fn run(self, listener: TcpListener, shutdown: CancellationToken) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = NormalizePathLayer::trim_trailing_slash().layer(self.router);

        axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The connection handle the handlers read through.
    pub fn handle(&self) -> &ConnectionHandle {
        &self.handle
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let response = next.run(request).await;
    metrics::record_request(&method, response.status().as_u16(), start);
    response
}

/// Requests running past `timeouts.request_secs` are answered with 408.
fn request_timeout(config: &ServiceConfig) -> TimeoutLayer {
    TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(config.timeouts.request_secs),
    )
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub name: String,
    pub status: HealthState,
    pub connected: bool,
    pub ticks: u64,
    pub consecutive_failures: u64,
    pub recoveries: u64,
    pub failed_recoveries: u64,
}

/// `GET /health`: the last observation of the health loop.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.health.snapshot();
    let report = HealthReport {
        name: state.check_name.to_string(),
        status: snapshot.state,
        connected: state.users.handle().is_set(),
        ticks: snapshot.ticks,
        consecutive_failures: snapshot.consecutive_failures,
        recoveries: snapshot.recoveries,
        failed_recoveries: snapshot.failed_recoveries,
    };

    let code = match snapshot.state {
        HealthState::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        HealthState::Healthy | HealthState::Unknown => StatusCode::OK,
    };
    (code, Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::db::Database;
    use axum::body::{to_bytes, Body};
    use axum::http::Request as HttpRequest;
    use tower::ServiceExt as _;

    fn server() -> (tempfile::TempDir, HttpServer, Arc<HealthStatus>) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&DatabaseConfig {
            url: dir.path().join("users.db").display().to_string(),
        })
        .unwrap();
        let health = Arc::new(HealthStatus::new());
        let server = HttpServer::new(
            ServiceConfig::default(),
            ConnectionHandle::new(db),
            health.clone(),
        );
        (dir, server, health)
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_unhealthy_as_503() {
        let (_dir, server, health) = server();
        let req = || HttpRequest::get("/health").body(Body::empty()).unwrap();

        let res = server.router().oneshot(req()).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await["status"], "unknown");

        health.mark_failure();
        let res = server.router().oneshot(req()).await.unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json_body(res).await;
        assert_eq!(body["status"], "unhealthy");
        assert_eq!(body["consecutive_failures"], 1);
        assert_eq!(body["connected"], true);
    }

    #[tokio::test]
    async fn test_response_carries_request_id() {
        let (_dir, server, _) = server();
        let res = server
            .router()
            .oneshot(HttpRequest::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(res.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_blank_username_is_400_envelope() {
        let (_dir, server, _) = server();
        let res = server
            .router()
            .oneshot(HttpRequest::get("/api/v1/users").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = json_body(res).await;
        assert_eq!(body["status"], 400);
        assert_eq!(body["message"], "Username is required");
    }

    #[tokio::test]
    async fn test_register_then_fetch() {
        let (_dir, server, _) = server();
        let res = server
            .router()
            .oneshot(
                HttpRequest::post("/api/v1/users")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"username":"ivy","password":"pw"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let id = json_body(res).await["id"].as_i64().unwrap();

        let res = server
            .router()
            .oneshot(
                HttpRequest::get(format!("/api/v1/users/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["username"], "ivy");
        assert!(body.get("password").is_none());
    }

    #[tokio::test]
    async fn test_closed_connection_is_500() {
        let (_dir, server, _) = server();
        server.handle.current().unwrap().close().unwrap();

        let res = server
            .router()
            .oneshot(HttpRequest::get("/api/v1/users/1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(res).await["message"], "An unexpected Error Occurred.");
    }

    #[tokio::test]
    async fn test_slow_request_times_out_with_408() {
        let mut config = ServiceConfig::default();
        config.timeouts.request_secs = 1;

        let router = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "late"
                }),
            )
            .layer(request_timeout(&config));

        let res = router
            .oneshot(HttpRequest::get("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::REQUEST_TIMEOUT);
    }
}
