use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/intake/undo", post(handlers::undo_form))
        .route("/intake/reset", post(handlers::reset_form))
        .route("/api/today", get(handlers::get_today))
        .route("/api/history", get(handlers::get_history))
        .route("/api/reminders", get(handlers::get_reminders))
        .route("/api/intake", post(handlers::add_intake))
        .route("/api/undo", post(handlers::undo))
        .route("/api/reset", post(handlers::reset_today))
        .route("/api/goal", put(handlers::set_goal))
        .route("/api/unit", put(handlers::set_unit))
        .route("/api/notify", post(handlers::toggle_reminders))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{Dashboard, HistoryResponse, MutationResponse};
    use crate::notify::FeedNotifier;
    use crate::storage::MemoryStore;
    use crate::tasks::ReminderScheduler;
    use crate::tracker::Tracker;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use chrono::NaiveDate;
    use serde::de::DeserializeOwned;
    use std::{sync::Arc, time::Duration};
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        clock: Arc<FixedClock>,
        state: AppState,
    }

    async fn test_app() -> TestApp {
        let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()));
        let tracker = Tracker::load(Arc::new(MemoryStore::new()), clock.clone(), None)
            .await
            .value;
        let notifier = Arc::new(FeedNotifier::new(clock.clone()));
        let reminders = ReminderScheduler::new(notifier.clone(), Duration::from_secs(60));
        let state = AppState::new(tracker, notifier, reminders);
        TestApp {
            router: router(state.clone()),
            clock,
            state,
        }
    }

    async fn call<T: DeserializeOwned>(app: &TestApp, method: &str, uri: &str, body: Option<&str>) -> T {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{method} {uri}");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn intake_flow_updates_dashboard() {
        let app = test_app().await;

        let added: MutationResponse = call(&app, "POST", "/api/intake", Some(r#"{"amount":250}"#)).await;
        assert!(added.persisted);
        assert_eq!(added.dashboard.total, 250);

        let added: MutationResponse =
            call(&app, "POST", "/api/intake", Some(r#"{"amount":"300"}"#)).await;
        assert_eq!(added.dashboard.total, 550);
        assert_eq!(added.dashboard.percent, 37);
        assert_eq!(added.dashboard.log[0].amount, 300);

        let undone: MutationResponse = call(&app, "POST", "/api/undo", None).await;
        assert_eq!(undone.dashboard.total, 250);

        let today: Dashboard = call(&app, "GET", "/api/today", None).await;
        assert_eq!(today.date, "2026-01-05");
        assert_eq!(today.total, 250);
        assert_eq!(today.trend.len(), 1);
    }

    #[tokio::test]
    async fn goal_and_unit_edits() {
        let app = test_app().await;

        let goal: MutationResponse = call(&app, "PUT", "/api/goal", Some(r#"{"goal":"999999"}"#)).await;
        assert_eq!(goal.dashboard.goal, 100_000);

        let goal: MutationResponse = call(&app, "PUT", "/api/goal", Some(r#"{"goal":"abc"}"#)).await;
        assert_eq!(goal.dashboard.goal, 0);

        let unit: MutationResponse = call(&app, "PUT", "/api/unit", Some(r#"{"unit":"oz"}"#)).await;
        assert_eq!(unit.dashboard.unit, "oz");
    }

    #[tokio::test]
    async fn toggle_starts_and_stops_reminders() {
        let app = test_app().await;

        let on: MutationResponse = call(&app, "POST", "/api/notify", None).await;
        assert!(on.dashboard.notify_on);
        assert_eq!(on.dashboard.reminder_label, "Reminders: ON");
        assert!(app.state.reminders.lock().await.is_running());

        let off: MutationResponse = call(&app, "POST", "/api/notify", None).await;
        assert!(!off.dashboard.notify_on);
        assert!(!app.state.reminders.lock().await.is_running());
    }

    #[tokio::test]
    async fn reading_after_midnight_rolls_over() {
        let app = test_app().await;
        let _: MutationResponse = call(&app, "POST", "/api/intake", Some(r#"{"amount":400}"#)).await;

        app.clock.advance_days(1);
        let today: Dashboard = call(&app, "GET", "/api/today", None).await;
        assert_eq!(today.date, "2026-01-06");
        assert_eq!(today.total, 0);

        let history: HistoryResponse = call(&app, "GET", "/api/history?limit=7", None).await;
        let totals: Vec<_> = history.entries.iter().map(|e| e.total).collect();
        assert_eq!(totals, [400, 0]);
    }

    #[tokio::test]
    async fn failed_write_is_reported_not_fatal() {
        let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()));
        let store = Arc::new(MemoryStore::new());
        let tracker = Tracker::load(store.clone(), clock.clone(), None).await.value;
        let notifier = Arc::new(FeedNotifier::new(clock.clone()));
        let reminders = ReminderScheduler::new(notifier.clone(), Duration::from_secs(60));
        let state = AppState::new(tracker, notifier, reminders);
        let app = TestApp {
            router: router(state.clone()),
            clock,
            state,
        };

        store.set_failing(true);
        let added: MutationResponse = call(&app, "POST", "/api/intake", Some(r#"{"amount":100}"#)).await;
        assert!(!added.persisted);
        assert_eq!(added.dashboard.total, 100);
    }

    #[tokio::test]
    async fn form_fallback_redirects_home() {
        let app = test_app().await;
        let request = Request::builder()
            .method("POST")
            .uri("/intake/reset")
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }
}
