pub mod app;
pub mod clock;
pub mod config;
pub mod errors;
pub mod gallery;
pub mod gate;
pub mod handlers;
pub mod journal;
pub mod models;
pub mod photo;
pub mod reminder;
pub mod state;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use journal::Journal;
pub use state::AppState;
