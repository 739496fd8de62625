pub mod advisor;
pub mod health;
pub mod metrics;
pub mod rate;
pub mod versions;
pub mod whatif;

use axum::Router;

use crate::state::AppState;

pub fn api_router(state: &AppState) -> Router<AppState> {
    let router = Router::new()
        .merge(health::router())
        .merge(rate::router())
        .merge(whatif::router())
        .merge(advisor::router())
        .merge(versions::router());

    if state.config.metrics_enabled {
        router.merge(metrics::router())
    } else {
        router
    }
}
