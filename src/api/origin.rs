//! Cross-origin policy for `/api`.
//!
//! The CORS layer answers preflights and decorates responses for allowed
//! origins. The guard turns away actual requests from any other origin
//! before they reach a handler. Requests without an `Origin` header are not
//! cross-origin and pass.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::api::routes::AppState;
use crate::error::AppError;

const ANY_ORIGIN: &str = "*";

pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let allow_origin = if allowed_origins.iter().any(|o| o == ANY_ORIGIN) {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origin_values(allowed_origins))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

fn origin_values(allowed_origins: &[String]) -> Vec<HeaderValue> {
    allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring unusable origin '{}'", origin);
                None
            }
        })
        .collect()
}

fn is_allowed(allowed_origins: &[String], origin: &str) -> bool {
    allowed_origins
        .iter()
        .any(|allowed| allowed == ANY_ORIGIN || allowed == origin)
}

pub async fn reject_foreign_origin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(origin) = request.headers().get(header::ORIGIN) {
        let allowed = origin
            .to_str()
            .map(|o| is_allowed(&state.allowed_origins, o))
            .unwrap_or(false);
        if !allowed {
            return Err(AppError::OriginNotAllowed(
                String::from_utf8_lossy(origin.as_bytes()).into_owned(),
            ));
        }
    }

    Ok(next.run(request).await)
}
