use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::{handlers, origin};
use crate::llm::CompletionProvider;
use crate::tts::SynthesisProvider;

pub struct AppState {
    pub completion: Arc<dyn CompletionProvider>,
    pub synthesis: Arc<dyn SynthesisProvider>,
    pub allowed_origins: Vec<String>,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = origin::cors_layer(&state.allowed_origins);

    let api_routes = Router::new()
        .route("/ask-gemini", post(handlers::ask_gemini))
        .route("/tts", post(handlers::tts))
        .route("/user-text", post(handlers::user_text))
        .route("/health", get(handlers::health))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            origin::reject_foreign_origin,
        ));

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
