pub mod app_config;
pub mod config;
pub mod engagement;
pub mod tokens;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use engagement::{
    hong_kong_offset, now_hong_kong, LatestCounts, Observation, ObservationLog,
};
pub use tokens::{tokens, TokenSettings};
