pub mod advice;
pub mod app;
pub mod chat;
pub mod clock;
pub mod config;
pub mod errors;
pub mod gemini;
pub mod handlers;
pub mod models;
pub mod session;
pub mod state;
pub mod stats;
pub mod storage;
pub mod timers;

pub use advice::AdviceClient;
pub use app::router;
pub use config::Config;
pub use session::SessionStore;
pub use state::AppState;
pub use storage::JsonFileStore;
