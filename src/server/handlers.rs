use super::AppState;
use crate::domain::Task;
use crate::error::TrackerError;
use crate::persistence::TaskStore;
use crate::report::{group_by_date, local_date, CalendarMonth, Statistics};
use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use chrono::{Datelike, TimeZone};
use serde::Deserialize;
use serde_json::{json, Value};

type ApiResult<T> = Result<Json<T>, TrackerError>;

#[derive(Deserialize)]
struct StartRequest {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
pub struct CalendarQuery {
    #[serde(default)]
    year: Option<String>,
    #[serde(default)]
    month: Option<String>,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

pub async fn list_tasks<S, Tz>(
    State(state): State<AppState<S, Tz>>,
) -> ApiResult<Vec<Task>>
where
    S: TaskStore + Send + 'static,
    Tz: TimeZone + Send + Sync + 'static,
{
    let tracker = state.tracker.lock().await;
    Ok(Json(tracker.history()?))
}

pub async fn current_task<S, Tz>(
    State(state): State<AppState<S, Tz>>,
) -> ApiResult<Option<Task>>
where
    S: TaskStore + Send + 'static,
    Tz: TimeZone + Send + Sync + 'static,
{
    let tracker = state.tracker.lock().await;
    Ok(Json(tracker.current()?))
}

pub async fn start_task<S, Tz>(
    State(state): State<AppState<S, Tz>>,
    body: Bytes,
) -> ApiResult<Task>
where
    S: TaskStore + Send + 'static,
    Tz: TimeZone + Send + Sync + 'static,
{
    // A missing or malformed body is treated like a missing name
    let name = serde_json::from_slice::<StartRequest>(&body)
        .ok()
        .and_then(|req| req.name)
        .unwrap_or_default();

    let mut tracker = state.tracker.lock().await;
    Ok(Json(tracker.start(&name, state.now())?))
}

pub async fn pause_task<S, Tz>(
    State(state): State<AppState<S, Tz>>,
) -> ApiResult<Task>
where
    S: TaskStore + Send + 'static,
    Tz: TimeZone + Send + Sync + 'static,
{
    let mut tracker = state.tracker.lock().await;
    Ok(Json(tracker.pause(state.now())?))
}

pub async fn resume_task<S, Tz>(
    State(state): State<AppState<S, Tz>>,
) -> ApiResult<Task>
where
    S: TaskStore + Send + 'static,
    Tz: TimeZone + Send + Sync + 'static,
{
    let mut tracker = state.tracker.lock().await;
    Ok(Json(tracker.resume(state.now())?))
}

pub async fn stop_task<S, Tz>(
    State(state): State<AppState<S, Tz>>,
) -> ApiResult<Task>
where
    S: TaskStore + Send + 'static,
    Tz: TimeZone + Send + Sync + 'static,
{
    let mut tracker = state.tracker.lock().await;
    Ok(Json(tracker.stop(state.now())?))
}

pub async fn calendar<S, Tz>(
    State(state): State<AppState<S, Tz>>,
    Query(query): Query<CalendarQuery>,
) -> ApiResult<CalendarMonth>
where
    S: TaskStore + Send + 'static,
    Tz: TimeZone + Send + Sync + 'static,
{
    let today = local_date(&state.now(), &state.tz);
    let year = parse_param(query.year.as_deref(), today.year(), "Invalid year")?;
    let month: u32 = parse_param(query.month.as_deref(), today.month(), "Invalid month")?;
    if !(1..=12).contains(&month) {
        return Err(TrackerError::InvalidInput("Invalid month".to_string()));
    }

    let history = state.tracker.lock().await.history()?;
    Ok(Json(group_by_date(&history, year, month, &state.tz)))
}

pub async fn statistics<S, Tz>(
    State(state): State<AppState<S, Tz>>,
) -> ApiResult<Statistics>
where
    S: TaskStore + Send + 'static,
    Tz: TimeZone + Send + Sync + 'static,
{
    let today = local_date(&state.now(), &state.tz);
    let history = state.tracker.lock().await.history()?;
    Ok(Json(Statistics::compute(&history, today, &state.tz, state.target_hours)))
}

fn parse_param<T: std::str::FromStr>(
    raw: Option<&str>,
    default: T,
    message: &str,
) -> Result<T, TrackerError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| TrackerError::InvalidInput(message.to_string())),
    }
}
