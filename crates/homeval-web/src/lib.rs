//! # Homeval Web
//!
//! axum service exposing the lead capture endpoint.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | POST | `/api/zestimate-lead` | [`routes::lookup_lead`] |
//! | OPTIONS | `/api/zestimate-lead` | [`routes::preflight`] |
//! | other | `/api/zestimate-lead` | 405 `{"error":"Use POST"}` |
//! | GET | `/health` | [`routes::health`] |
//!
//! Browsers call the endpoint cross-origin from a landing page, so every
//! response mirrors the request `Origin`. Requests without one get `*`.

pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// Builds the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(
            routes::LEAD_PATH,
            post(routes::lookup_lead)
                .options(routes::preflight)
                .fallback(routes::method_not_allowed),
        )
        .route("/health", get(routes::health))
        .layer(cors)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
