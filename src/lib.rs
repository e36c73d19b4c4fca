pub mod app;
pub mod clock;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod history;
pub mod models;
pub mod notify;
pub mod progress;
pub mod state;
pub mod storage;
pub mod tasks;
pub mod tracker;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use tracker::Tracker;
