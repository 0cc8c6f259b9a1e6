//! Composition root: builds every provider once and wires the router.

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use faultline_core::db::DatabasePool;
use faultline_core::errors::Result;

use crate::config::ServerConfig;
use crate::error_response::route_not_found;
use crate::health::{router as health_router, HealthState};

pub struct AppModule {
    pub router: Router,
    pub database: Option<DatabasePool>,
}

impl AppModule {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let database = DatabasePool::connect_lazy(config.core())?;
        Ok(build_app(config, database))
    }
}

pub fn build_app(config: &ServerConfig, database: Option<DatabasePool>) -> AppModule {
    let health_state = HealthState::new(config.core(), database.clone());
    let health_router = health_router(health_state);

    let router = Router::new()
        .merge(health_router)
        .fallback(route_not_found)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(cors_layer(&config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http());

    AppModule { router, database }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(%origin, ?err, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(allowed)
}
