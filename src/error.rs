use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::llm::CompletionError;
use crate::tts::SynthesisError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("No text provided")]
    NoText,

    #[error("Gemini API error: {0}")]
    Completion(#[from] CompletionError),

    #[error("TTS error: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("Origin not allowed: {0}")]
    OriginNotAllowed(String),
}

/// Body of every failed response. Only the fixed message reaches the client.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NoText => StatusCode::BAD_REQUEST,
            AppError::Completion(_) | AppError::Synthesis(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::OriginNotAllowed(_) => StatusCode::FORBIDDEN,
        }
    }

    pub fn public_message(&self) -> &'static str {
        match self {
            AppError::NoText => "No text provided",
            AppError::Completion(_) => "Gemini API error",
            AppError::Synthesis(_) => "TTS error",
            AppError::OriginNotAllowed(_) => "Origin not allowed",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        (
            status,
            Json(ErrorResponse {
                error: self.public_message(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn upstream_details_stay_out_of_the_body() {
        let (status, body) = body_json(AppError::Completion(CompletionError::Decode(
            "expected value at line 1".into(),
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({"error": "Gemini API error"}));

        let (status, body) =
            body_json(AppError::Synthesis(SynthesisError::Status(StatusCode::UNAUTHORIZED))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({"error": "TTS error"}));
    }

    #[tokio::test]
    async fn client_errors_map_to_4xx() {
        let (status, body) = body_json(AppError::NoText).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"error": "No text provided"}));

        let (status, body) = body_json(AppError::OriginNotAllowed("http://evil.test".into())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, serde_json::json!({"error": "Origin not allowed"}));
    }
}
