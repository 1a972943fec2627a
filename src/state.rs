use crate::config::Config;
use axum::extract::FromRef;
use sqlx::PgPool;

/// Shared application state, cloned into every handler.
/// Holds no per-request data; the pool is the only shared resource.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
}

// FromRef lets handlers extract State<PgPool> or State<Config> directly.

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
