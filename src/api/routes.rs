use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::dispatch::Dispatcher;
use crate::domain::ResponsePolicy;

use super::request::DispatchRequest;
use super::response::{DispatchResponse, ErrorResponse, HealthResponse, ReadyResponse};

/// Requests served at once.
const MAX_IN_FLIGHT: usize = 256;

/// Shared application state.
pub struct AppState {
    /// Dispatcher bound to the execution queues
    pub dispatcher: Dispatcher,

    /// Current response policy (updated via watch channel)
    pub policy_rx: watch::Receiver<Arc<ResponsePolicy>>,

    /// Application start time
    pub start_time: Instant,

    /// Application version
    pub version: String,
}

/// Create the application router.
pub fn create_router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    Router::new()
        .route("/v1/active-response/dispatch", post(handle_dispatch))
        .route("/health", get(handle_health))
        .route("/ready", get(handle_ready))
        .route("/metrics", get(handle_metrics))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(ConcurrencyLimitLayer::new(MAX_IN_FLIGHT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run a configured response for one alert.
///
/// Event fields are checked before they reach the space-delimited message,
/// and the queue write runs off the async workers.
async fn handle_dispatch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DispatchRequest>,
) -> axum::response::Response {
    if let Err(e) = req.event.validate() {
        warn!(event_id = %req.event.event_id.0, error = %e, "Rejected dispatch request");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::invalid_event(&e)),
        )
            .into_response();
    }

    let policy = state.policy_rx.borrow().clone();

    let Some(response) = policy.find_response(&req.response).cloned() else {
        warn!(response = %req.response, "Dispatch requested for unknown response");
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::unknown_response(&req.response)),
        )
            .into_response();
    };

    let dispatcher = state.dispatcher.clone();
    let snapshot = policy.clone();
    let result = tokio::task::spawn_blocking(move || {
        dispatcher.dispatch(&req.event, &response, &snapshot)
    })
    .await;

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "Dispatch task failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Dispatch task failed", "INTERNAL_ERROR")),
            )
                .into_response();
        }
    };

    match result {
        Ok(disposition) => (
            StatusCode::OK,
            Json(DispatchResponse::new(disposition, policy.version.clone())),
        )
            .into_response(),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse::new(e.to_string(), e.code())),
        )
            .into_response(),
    }
}

/// Health check endpoint.
async fn handle_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let policy = state.policy_rx.borrow().clone();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        policy_version: policy.version.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// Readiness check endpoint.
async fn handle_ready(State(state): State<Arc<AppState>>) -> axum::response::Response {
    let policy = state.policy_rx.borrow().clone();

    if policy.responses.is_empty() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("No active responses configured", "NOT_READY")),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        Json(ReadyResponse {
            ready: true,
            policy_version: policy.version.clone(),
            responses: policy.responses.len(),
            local_ar: policy.local_ar,
            remote_ar: policy.remote_ar,
        }),
    )
        .into_response()
}

/// Metrics endpoint (Prometheus format).
async fn handle_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let policy = state.policy_rx.borrow().clone();

    let metrics = format!(
        r#"# HELP ardispatch_uptime_seconds Application uptime in seconds
# TYPE ardispatch_uptime_seconds counter
ardispatch_uptime_seconds {}

# HELP ardispatch_responses Number of active responses configured
# TYPE ardispatch_responses gauge
ardispatch_responses {}

# HELP ardispatch_ignore_entries Number of ignore-list entries
# TYPE ardispatch_ignore_entries gauge
ardispatch_ignore_entries {}

{}"#,
        state.start_time.elapsed().as_secs(),
        policy.responses.len(),
        policy.ignore.len(),
        state.dispatcher.metrics().to_prometheus(),
    );

    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; charset=utf-8",
        )],
        metrics,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ActiveResponse, Locality};
    use crate::observability::MetricsRegistry;
    use crate::queue::MockQueue;
    use axum::body::Body;
    use axum::http::Request;

    struct Harness {
        app: Router,
        local: Arc<MockQueue>,
        forward: Arc<MockQueue>,
    }

    fn harness(policy: ResponsePolicy) -> Harness {
        let local = Arc::new(MockQueue::new("execq"));
        let forward = Arc::new(MockQueue::new("arq"));
        let dispatcher = Dispatcher::new(
            local.clone(),
            forward.clone(),
            Arc::new(MetricsRegistry::new()),
        );

        let (_tx, rx) = watch::channel(Arc::new(policy));

        let state = Arc::new(AppState {
            dispatcher,
            policy_rx: rx,
            start_time: Instant::now(),
            version: "0.1.0-test".to_string(),
        });

        Harness {
            app: create_router(state, Duration::from_secs(5)),
            local,
            forward,
        }
    }

    fn test_policy() -> ResponsePolicy {
        ResponsePolicy {
            version: "test-v1".to_string(),
            ignore: vec!["127.0.0.1".to_string()],
            local_ar: true,
            remote_ar: true,
            responses: vec![
                ActiveResponse::new("host-deny", Locality::ServerOnly, ""),
                ActiveResponse::new("firewall-drop", Locality::RemoteAgent, "007"),
            ],
        }
    }

    fn dispatch_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/v1/active-response/dispatch")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let h = harness(test_policy());

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = tower::ServiceExt::oneshot(h.app, request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["policy_version"], "test-v1");
    }

    #[tokio::test]
    async fn test_ready_without_responses() {
        let h = harness(ResponsePolicy::empty());

        let request = Request::builder().uri("/ready").body(Body::empty()).unwrap();
        let response = tower::ServiceExt::oneshot(h.app, request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_dispatch_forwarded() {
        let h = harness(test_policy());

        let request = dispatch_request(
            r#"{"response": "firewall-drop",
                "event": {"srcip": "10.0.0.5:4000", "location": "(web01) 10.1.1.1->/var/log/secure"}}"#,
        );
        let response = tower::ServiceExt::oneshot(h.app, request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["disposition"], "SENT_FORWARD");
        assert_eq!(
            h.forward.sent(),
            vec!["(web01) 10.1.1.1->/var/log/secure R 007 firewall-drop  10.0.0.5"]
        );
        assert!(h.local.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_ignored() {
        let h = harness(test_policy());

        let request = dispatch_request(
            r#"{"response": "host-deny", "event": {"srcip": "127.0.0.1", "location": "local", "user": "root"}}"#,
        );
        let response = tower::ServiceExt::oneshot(h.app, request).await.unwrap();

        let json = body_json(response).await;
        assert_eq!(json["disposition"], "SUPPRESSED");
        assert_eq!(json["reason"], "ignored");
        assert!(h.local.is_empty());
        assert!(h.forward.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_rejects_user_with_spaces() {
        let h = harness(test_policy());

        let request = dispatch_request(
            r#"{"response": "host-deny", "event": {"srcip": "10.0.0.5", "location": "local", "user": "root 8.8.8.8"}}"#,
        );
        let response = tower::ServiceExt::oneshot(h.app, request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "INVALID_EVENT");
        assert!(h.local.is_empty());
        assert!(h.forward.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_rejects_control_chars_in_location() {
        let h = harness(test_policy());

        let request = dispatch_request(
            r#"{"response": "firewall-drop", "event": {"srcip": "10.0.0.5", "location": "(web01) any->x\nagent02"}}"#,
        );
        let response = tower::ServiceExt::oneshot(h.app, request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(h.forward.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_unknown_response() {
        let h = harness(test_policy());

        let request = dispatch_request(
            r#"{"response": "restart-service", "event": {"srcip": "10.0.0.5", "location": "local"}}"#,
        );
        let response = tower::ServiceExt::oneshot(h.app, request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["code"], "UNKNOWN_RESPONSE");
    }

    #[tokio::test]
    async fn test_dispatch_queue_failure() {
        let h = harness(test_policy());
        h.local.set_failing(true);

        let request = dispatch_request(
            r#"{"response": "host-deny", "event": {"srcip": "10.0.0.5", "location": "local", "user": "root"}}"#,
        );
        let response = tower::ServiceExt::oneshot(h.app, request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(response).await["code"], "LOCAL_QUEUE_FAILURE");
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let h = harness(test_policy());

        let request = dispatch_request(
            r#"{"response": "host-deny", "event": {"srcip": "10.0.0.5", "location": "local", "user": "root"}}"#,
        );
        let app = h.app.clone();
        tower::ServiceExt::oneshot(app, request).await.unwrap();

        let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let response = tower::ServiceExt::oneshot(h.app, request).await.unwrap();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("ardispatch_responses 2"));
        assert!(text.contains("ardispatch_sent_total{queue=\"local\"} 1"));
    }
}
