pub mod error;
pub mod handlers;

use crate::persistence::TaskStore;
use crate::tracker::Tracker;
use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Local, TimeZone, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state for request handlers.
///
/// The tracker sits behind one async mutex so that timer operations from
/// concurrent requests run strictly one after another. `tz` decides which
/// calendar day a task belongs to.
pub struct AppState<S: TaskStore, Tz: TimeZone = Local> {
    tracker: Arc<Mutex<Tracker<S>>>,
    tz: Tz,
    target_hours: f64,
    clock: fn() -> DateTime<Utc>,
}

impl<S: TaskStore, Tz: TimeZone> Clone for AppState<S, Tz> {
    fn clone(&self) -> Self {
        Self {
            tracker: Arc::clone(&self.tracker),
            tz: self.tz.clone(),
            target_hours: self.target_hours,
            clock: self.clock,
        }
    }
}

impl<S: TaskStore, Tz: TimeZone> AppState<S, Tz> {
    pub fn new(tracker: Tracker<S>, tz: Tz, target_hours: f64) -> Self {
        Self {
            tracker: Arc::new(Mutex::new(tracker)),
            tz,
            target_hours,
            clock: Utc::now,
        }
    }

    /// Replace the wall clock (used by tests)
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

/// Build the API router
pub fn router<S, Tz>(state: AppState<S, Tz>) -> Router
where
    S: TaskStore + Send + 'static,
    Tz: TimeZone + Send + Sync + 'static,
{
    use error::method_not_allowed;
    use handlers::*;

    Router::new()
        .route("/health", get(health).fallback(method_not_allowed))
        .route("/api/tasks", get(list_tasks::<S, Tz>).fallback(method_not_allowed))
        .route("/api/current", get(current_task::<S, Tz>).fallback(method_not_allowed))
        .route("/api/tasks/start", post(start_task::<S, Tz>).fallback(method_not_allowed))
        .route("/api/tasks/pause", post(pause_task::<S, Tz>).fallback(method_not_allowed))
        .route("/api/tasks/resume", post(resume_task::<S, Tz>).fallback(method_not_allowed))
        .route("/api/tasks/stop", post(stop_task::<S, Tz>).fallback(method_not_allowed))
        .route("/api/calendar", get(calendar::<S, Tz>).fallback(method_not_allowed))
        .route("/api/stats", get(statistics::<S, Tz>).fallback(method_not_allowed))
        .fallback(error::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `listen` and serve the API until Ctrl-C
pub async fn serve<S, Tz>(state: AppState<S, Tz>, listen: &str) -> Result<()>
where
    S: TaskStore + Send + 'static,
    Tz: TimeZone + Send + Sync + 'static,
{
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("Failed to bind {}", listen))?;
    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Task;
    use crate::persistence::{FailingStore, MemoryStore};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use chrono::{Duration, FixedOffset};
    use serde_json::Value;
    use tower::ServiceExt;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn test_app(store: MemoryStore) -> Router {
        router(AppState::new(Tracker::new(store), Utc, 8.0).with_clock(fixed_now))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn finished_at(name: &str, start: DateTime<Utc>, minutes: i64) -> Task {
        let mut task = Task::new(name, start);
        task.finalize(start + Duration::minutes(minutes));
        task
    }

    #[tokio::test]
    async fn test_current_is_null_when_idle() {
        let app = test_app(MemoryStore::default());
        let (status, body) = send(&app, "GET", "/api/current", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn test_full_lifecycle_over_http() {
        let app = test_app(MemoryStore::default());

        let (status, task) = send(&app, "POST", "/api/tasks/start", r#"{"name":"Writing"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(task["name"], "Writing");
        assert_eq!(task["color"], "hsl(76, 70%, 50%)");

        let (_, current) = send(&app, "GET", "/api/current", "").await;
        assert_eq!(current["id"], task["id"]);

        let (status, paused) = send(&app, "POST", "/api/tasks/pause", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(paused["isPaused"], true);

        let (status, resumed) = send(&app, "POST", "/api/tasks/resume", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resumed["isPaused"], false);
        assert!(resumed.get("pauseStartTime").is_none());

        let (status, stopped) = send(&app, "POST", "/api/tasks/stop", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stopped["duration"], 0);

        let (_, tasks) = send(&app, "GET", "/api/tasks", "").await;
        assert_eq!(tasks.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_precondition_failures_are_400_with_message() {
        let app = test_app(MemoryStore::default());

        let (status, body) = send(&app, "POST", "/api/tasks/start", r#"{"name":"  "}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Task name is required");

        let (status, body) = send(&app, "POST", "/api/tasks/start", "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Task name is required");

        let (status, body) = send(&app, "POST", "/api/tasks/pause", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No task in progress");

        send(&app, "POST", "/api/tasks/start", r#"{"name":"Writing"}"#).await;
        let (status, body) = send(&app, "POST", "/api/tasks/start", r#"{"name":"Other"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "A task is already in progress");

        let (status, body) = send(&app, "POST", "/api/tasks/resume", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Task is not paused");
    }

    #[tokio::test]
    async fn test_wrong_method_is_405_json() {
        let app = test_app(MemoryStore::default());

        let (status, body) = send(&app, "GET", "/api/tasks/start", "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "Method not allowed");

        let (status, _) = send(&app, "POST", "/api/calendar", "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_unknown_path_is_404_json() {
        let app = test_app(MemoryStore::default());
        let (status, body) = send(&app, "GET", "/api/nope", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not Found");
    }

    #[tokio::test]
    async fn test_calendar_groups_history() {
        let store = MemoryStore {
            active: None,
            tasks: vec![
                finished_at("Writing", Utc.with_ymd_and_hms(2024, 3, 15, 11, 0, 0).unwrap(), 90),
                finished_at("Review", Utc.with_ymd_and_hms(2024, 2, 10, 11, 0, 0).unwrap(), 30),
            ],
        };
        let app = test_app(store);

        let (status, body) = send(&app, "GET", "/api/calendar?year=2024&month=3", "").await;
        assert_eq!(status, StatusCode::OK);
        let day = &body["2024-03-15"];
        assert_eq!(day.as_array().unwrap().len(), 1);
        assert_eq!(day[0]["hours"], 1);
        assert_eq!(day[0]["minutes"], 30);

        let (_, february) = send(&app, "GET", "/api/calendar?year=2024&month=2", "").await;
        assert!(february.get("2024-02-10").is_some());

        // Defaults to the clock's month
        let (_, default_month) = send(&app, "GET", "/api/calendar", "").await;
        assert_eq!(default_month, body);
    }

    #[tokio::test]
    async fn test_calendar_rejects_bad_month() {
        let app = test_app(MemoryStore::default());
        let (status, body) = send(&app, "GET", "/api/calendar?year=2024&month=13", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid month");

        let (status, _) = send(&app, "GET", "/api/calendar?year=soon", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let store = MemoryStore {
            active: None,
            tasks: vec![finished_at(
                "Writing",
                Utc.with_ymd_and_hms(2024, 3, 15, 11, 0, 0).unwrap(),
                120,
            )],
        };
        let app = test_app(store);

        let (status, body) = send(&app, "GET", "/api/stats", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["todayTotal"], 7_200_000);
        assert_eq!(body["todayPercentage"], 25.0);
        assert_eq!(body["monthCount"], 1);
        assert_eq!(body["dailyAverage"], 7_200_000);
    }

    #[tokio::test]
    async fn test_calendar_buckets_by_configured_zone() {
        let store = MemoryStore {
            active: None,
            tasks: vec![finished_at(
                "Late shift",
                Utc.with_ymd_and_hms(2024, 3, 15, 20, 0, 0).unwrap(),
                60,
            )],
        };
        let east = FixedOffset::east_opt(10 * 3600).unwrap();
        let app = router(AppState::new(Tracker::new(store), east, 8.0).with_clock(fixed_now));

        let (_, body) = send(&app, "GET", "/api/calendar?year=2024&month=3", "").await;
        assert!(body.get("2024-03-15").is_none());
        assert_eq!(body["2024-03-16"][0]["hours"], 1);
    }

    #[tokio::test]
    async fn test_storage_failure_is_503() {
        let app = router(AppState::new(Tracker::new(FailingStore), Utc, 8.0).with_clock(fixed_now));

        for (method, uri) in [
            ("POST", "/api/tasks/pause"),
            ("POST", "/api/tasks/stop"),
            ("GET", "/api/current"),
            ("GET", "/api/tasks"),
            ("GET", "/api/stats"),
        ] {
            let (status, body) = send(&app, method, uri, "").await;
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{} {}", method, uri);
            let message = body["error"].as_str().unwrap();
            assert!(message.starts_with("Storage unavailable: "), "{}", message);
            assert_ne!(message, "No task in progress");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_starts_admit_one_task() {
        let app = test_app(MemoryStore::default());

        let requests: Vec<_> = (0..16)
            .map(|i| {
                let app = app.clone();
                tokio::spawn(async move {
                    let body = format!(r#"{{"name":"Task {}"}}"#, i);
                    send(&app, "POST", "/api/tasks/start", &body).await
                })
            })
            .collect();

        let mut started = 0;
        for request in requests {
            let (status, body) = request.await.unwrap();
            if status == StatusCode::OK {
                started += 1;
            } else {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(body["error"], "A task is already in progress");
            }
        }
        assert_eq!(started, 1);

        let (_, current) = send(&app, "GET", "/api/current", "").await;
        assert!(current["name"].as_str().unwrap().starts_with("Task "));
    }
}
