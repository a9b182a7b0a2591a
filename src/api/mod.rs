//! HTTP layer: system endpoints and router composition.

pub mod handlers;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// Builds the router with all HTTP endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new().merge(handlers::system::routes())
}

/// Builds the complete application: HTTP endpoints, the `/ws` game
/// endpoint, request tracing and CORS.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::config::ConnectionSettings;
    use crate::domain::SessionRegistry;

    fn test_app() -> (Router, Arc<SessionRegistry>) {
        let registry = Arc::new(SessionRegistry::default());
        let state = AppState::new(Arc::clone(&registry), ConnectionSettings::default());
        (build_app(state), registry)
    }

    async fn get_json(app: Router, uri: &str) -> serde_json::Value {
        let Ok(request) = Request::builder().uri(uri).body(Body::empty()) else {
            panic!("valid request");
        };
        let Ok(response) = app.oneshot(request).await else {
            panic!("request failed");
        };
        assert_eq!(response.status(), StatusCode::OK);
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body read failed");
        };
        let Ok(value) = serde_json::from_slice(&bytes) else {
            panic!("body is not JSON");
        };
        value
    }

    #[tokio::test]
    async fn health_reports_active_sessions() {
        let (app, registry) = test_app();
        let _ = registry.create_session().await;

        let body = get_json(app, "/health").await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["active_sessions"], 1);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn openapi_lists_health_path() {
        let (app, _) = test_app();
        let body = get_json(app, "/api-docs/openapi.json").await;
        assert!(body["paths"]["/health"].is_object());
    }

    #[tokio::test]
    async fn ws_route_requires_upgrade() {
        let (app, _) = test_app();
        let Ok(request) = Request::builder().uri("/ws").body(Body::empty()) else {
            panic!("valid request");
        };
        let Ok(response) = app.oneshot(request).await else {
            panic!("request failed");
        };
        assert!(response.status().is_client_error());
    }
}
