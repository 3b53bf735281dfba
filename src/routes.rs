// routes.rs
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use http::{header::CONTENT_TYPE, Method};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{config::Config, handlers, AppState};

pub fn create_routes(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/poll", get(handlers::list_polls).post(handlers::create_poll))
        .route("/poll/{id}/choice", get(handlers::list_choices))
        .route("/poll/{id}/result", get(handlers::poll_result))
        .route("/choice", post(handlers::create_choice))
        .route("/choice/{id}/vote", post(handlers::cast_vote))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origin = match &config.cors_allow_origin {
        Some(origin) => AllowOrigin::exact(origin.clone()),
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60))
}
