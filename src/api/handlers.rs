use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures_util::TryStreamExt;
use std::sync::Arc;

use super::{HealthResponse, StatusResponse, TextPayload};
use crate::api::routes::AppState;
use crate::error::AppError;
use crate::tts::{AudioStream, AUDIO_CONTENT_TYPE};

/// Asks the language model, then speaks its reply.
pub async fn ask_gemini(
    State(state): State<Arc<AppState>>,
    TextPayload(text): TextPayload,
) -> Result<Response, AppError> {
    let reply = state.completion.complete(&text).await?;
    tracing::info!("Completion ready ({} chars), synthesizing", reply.len());

    let audio = state.synthesis.synthesize(&reply).await?;
    Ok(audio_response(audio))
}

/// Speaks the given text as-is.
pub async fn tts(
    State(state): State<Arc<AppState>>,
    TextPayload(text): TextPayload,
) -> Result<Response, AppError> {
    let audio = state.synthesis.synthesize(&text).await?;
    Ok(audio_response(audio))
}

/// Acknowledges the text without doing anything with it yet.
pub async fn user_text(TextPayload(text): TextPayload) -> Json<StatusResponse> {
    tracing::debug!("Received user text ({} chars)", text.len());
    Json(StatusResponse { status: "received" })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn audio_response(audio: AudioStream) -> Response {
    // Headers are already sent, so a broken upstream can only be logged.
    let audio = audio.inspect_err(|e| tracing::error!("Audio relay aborted: {}", e));

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, AUDIO_CONTENT_TYPE)],
        Body::from_stream(audio),
    )
        .into_response()
}
