pub mod handlers;
pub mod origin;
pub mod routes;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Non-empty `text` taken from a JSON body. Any body that does not yield one
/// is answered with [`AppError::NoText`].
#[derive(Debug)]
pub struct TextPayload(pub String);

#[async_trait]
impl<S> FromRequest<S> for TextPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<TextRequest>::from_request(req, state)
            .await
            .map_err(|rejection| {
                tracing::debug!("Unreadable request body: {}", rejection.body_text());
                AppError::NoText
            })?;

        match body.text {
            Some(text) if !text.is_empty() => Ok(TextPayload(text)),
            _ => Err(AppError::NoText),
        }
    }
}
