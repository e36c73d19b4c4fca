use hydropulse::{
    AppState, Config, Tracker,
    clock::SystemClock,
    notify::FeedNotifier,
    router,
    storage::FileStore,
    tasks::{ReminderScheduler, spawn_rollover_watcher},
};
use std::sync::Arc;
use tokio::fs;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    fs::create_dir_all(&config.data_dir).await?;
    info!(data_dir = %config.data_dir.display(), "using data directory");

    let clock = Arc::new(SystemClock);
    let store = Arc::new(FileStore::new(config.data_dir.clone()));
    let loaded = Tracker::load(store, clock.clone(), config.history_limit).await;
    info!(status = ?loaded.status, date = %loaded.value.state().date, "state loaded");

    let notifier = Arc::new(FeedNotifier::new(clock));
    let mut reminders = ReminderScheduler::new(notifier.clone(), config.reminder_interval);
    reminders.apply(loaded.value.state().notify_on);

    let state = AppState::new(loaded.value, notifier, reminders);
    spawn_rollover_watcher(state.tracker.clone(), config.rollover_tick);

    let app = router(state);
    let addr = config.addr();
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
