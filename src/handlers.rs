use crate::errors::{AppError, StorageError};
use crate::history;
use crate::models::{
    Dashboard, GoalRequest, HistoryQuery, HistoryResponse, IntakeRequest, MutationResponse,
    Reminder, RemindersQuery, UnitRequest,
};
use crate::notify::{ToggleOutcome, toggle_notify};
use crate::state::AppState;
use crate::tracker::Tracker;
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Query, State},
    response::{Html, Redirect},
};
use tokio::sync::MutexGuard;
use tracing::{debug, warn};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let tracker = current(&state).await;
    Html(render_index(&tracker.dashboard().await))
}

pub async fn get_today(State(state): State<AppState>) -> Json<Dashboard> {
    let tracker = current(&state).await;
    Json(tracker.dashboard().await)
}

pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Json<HistoryResponse> {
    let tracker = current(&state).await;
    let loaded = tracker.history().await;
    let entries = match query.limit {
        Some(limit) => history::recent(&loaded.value, limit).to_vec(),
        None => loaded.value,
    };
    Json(HistoryResponse {
        entries,
        status: loaded.status,
    })
}

pub async fn get_reminders(
    State(state): State<AppState>,
    Query(query): Query<RemindersQuery>,
) -> Json<Vec<Reminder>> {
    Json(state.notifier.since(query.after))
}

pub async fn add_intake(
    State(state): State<AppState>,
    Json(payload): Json<IntakeRequest>,
) -> Json<MutationResponse> {
    let amount = payload.amount.as_int().unwrap_or(0);
    let mut tracker = state.tracker.lock().await;
    let result = tracker.add(amount).await;
    Json(respond("add", result, &tracker).await)
}

pub async fn undo(State(state): State<AppState>) -> Json<MutationResponse> {
    let mut tracker = state.tracker.lock().await;
    let result = tracker.undo().await;
    Json(respond("undo", result, &tracker).await)
}

pub async fn reset_today(State(state): State<AppState>) -> Json<MutationResponse> {
    let mut tracker = state.tracker.lock().await;
    let result = tracker.reset_today().await;
    Json(respond("reset", result, &tracker).await)
}

pub async fn set_goal(
    State(state): State<AppState>,
    Json(payload): Json<GoalRequest>,
) -> Json<MutationResponse> {
    let mut tracker = state.tracker.lock().await;
    let result = tracker.set_goal(payload.goal).await;
    Json(respond("set goal", result, &tracker).await)
}

pub async fn set_unit(
    State(state): State<AppState>,
    Json(payload): Json<UnitRequest>,
) -> Json<MutationResponse> {
    let mut tracker = state.tracker.lock().await;
    let result = tracker.set_unit(payload.unit).await;
    Json(respond("set unit", result, &tracker).await)
}

pub async fn toggle_reminders(
    State(state): State<AppState>,
) -> Result<Json<MutationResponse>, AppError> {
    let mut tracker = state.tracker.lock().await;
    let result = match toggle_notify(&mut tracker, state.notifier.as_ref()).await {
        Ok(ToggleOutcome::Unsupported) => {
            return Err(AppError::bad_request("Notifications not supported"));
        }
        Ok(ToggleOutcome::Denied) => {
            debug!("notification permission denied");
            return Ok(Json(respond("toggle reminders", Ok(()), &tracker).await));
        }
        Ok(_) => Ok(()),
        Err(err) => Err(err),
    };

    state.reminders.lock().await.apply(tracker.state().notify_on);
    Ok(Json(respond("toggle reminders", result, &tracker).await))
}

pub async fn undo_form(State(state): State<AppState>) -> Redirect {
    let mut tracker = state.tracker.lock().await;
    if let Err(err) = tracker.undo().await {
        warn!("undo was not persisted: {err}");
    }
    Redirect::to("/")
}

pub async fn reset_form(State(state): State<AppState>) -> Redirect {
    let mut tracker = state.tracker.lock().await;
    if let Err(err) = tracker.reset_today().await {
        warn!("reset was not persisted: {err}");
    }
    Redirect::to("/")
}

/// Locks the tracker with today's date applied.
async fn current(state: &AppState) -> MutexGuard<'_, Tracker> {
    let mut tracker = state.tracker.lock().await;
    if let Err(err) = tracker.ensure_today().await {
        warn!("rollover was not persisted: {err}");
    }
    tracker
}

async fn respond(
    action: &str,
    result: Result<(), StorageError>,
    tracker: &Tracker,
) -> MutationResponse {
    let persisted = match result {
        Ok(()) => true,
        Err(err) => {
            warn!(action, "change was not persisted: {err}");
            false
        }
    };
    MutationResponse {
        persisted,
        dashboard: tracker.dashboard().await,
    }
}
