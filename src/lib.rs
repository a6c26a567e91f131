pub mod app;
pub mod clock;
pub mod config;
pub mod dialog;
pub mod errors;
pub mod gateway;
pub mod handlers;
pub mod models;
pub mod scheduler;
pub mod state;
pub mod store;
pub mod streak;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::{AppState, HabitStore};
