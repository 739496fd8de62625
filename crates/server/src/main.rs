use axum::Router;
use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};

use rating_server::config::AppConfig;
use rating_server::routes::api_router;
use rating_server::state::AppState;

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level.clone()));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if config.json_logging {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let bind_addr = config.bind_addr;
    let cors_origins = config.cors_origins.clone();
    let state = AppState::new(config);

    let cors = match cors_origins {
        Some(origins) => {
            let parsed: Vec<HeaderValue> =
                origins.iter().filter_map(|origin| origin.parse::<HeaderValue>().ok()).collect();
            CorsLayer::new().allow_origin(parsed).allow_methods(Any).allow_headers(Any)
        }
        None => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new().nest("/api", api_router(&state)).layer(cors).with_state(state);

    tracing::info!(%bind_addr, "starting rating-server");
    let listener = tokio::net::TcpListener::bind(bind_addr).await.expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
