// Session tracking, league operations and the orchestrator loop.

pub mod app;
pub mod service;
pub mod session;

pub use app::{run, AppState};
pub use service::{LeagueService, ServiceError};
pub use session::SessionStore;
