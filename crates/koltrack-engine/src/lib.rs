pub mod error;
pub mod queue;
pub mod reconcile;
pub mod refresh;

pub use error::EngineError;
pub use queue::{RefreshBackend, RefreshQueue, ScrapeRefresher};
pub use reconcile::{match_scraped, observation_from, short_code};
pub use refresh::{refresh_all, refresh_one, refresh_posts};
