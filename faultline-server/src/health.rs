use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use faultline_core::config::{CoreConfig, Environment};
use faultline_core::db::DatabasePool;
use faultline_core::logging::report_error;

#[derive(Clone)]
pub struct HealthState {
    service_name: String,
    environment: Environment,
    database: Option<DatabasePool>,
}

impl HealthState {
    pub fn new(config: &CoreConfig, database: Option<DatabasePool>) -> Self {
        Self {
            service_name: config.service_name.clone(),
            environment: config.environment,
            database,
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: String,
    environment: &'static str,
    database: &'static str,
    checked_at: DateTime<Utc>,
}

pub fn router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state)
}

async fn health(State(state): State<HealthState>) -> impl IntoResponse {
    let database = match &state.database {
        None => "disabled",
        Some(pool) => match pool.ping().await {
            Ok(()) => "up",
            Err(err) => {
                report_error(&err);
                "down"
            }
        },
    };

    let healthy = database != "down";
    debug!(database, healthy, "health probe");

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if healthy { "ok" } else { "degraded" },
        service: state.service_name.clone(),
        environment: state.environment.as_str(),
        database,
        checked_at: Utc::now(),
    };

    (status, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn reports_disabled_database() {
        let config = CoreConfig {
            service_name: "billing".into(),
            ..CoreConfig::default()
        };
        let app = router(HealthState::new(&config, None));

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "billing");
        assert_eq!(body["environment"], "development");
        assert_eq!(body["database"], "disabled");
        assert!(body["checked_at"].is_string());
    }

    #[tokio::test]
    async fn unreachable_database_is_degraded() {
        let pool = DatabasePool::connect_lazy_with_url("postgres://u:p@127.0.0.1:1/db")
            .expect("lazy pool");
        let app = router(HealthState::new(&CoreConfig::default(), Some(pool)));

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["database"], "down");
    }
}
