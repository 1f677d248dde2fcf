//! Speech synthesis: turns reply text into a stream of MPEG audio.

pub mod elevenlabs;
pub mod stream;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use reqwest::StatusCode;

pub use elevenlabs::ElevenLabsClient;

/// Audio body relayed to the client. Dropping it releases the upstream
/// connection.
pub type AudioStream = BoxStream<'static, Result<Bytes, SynthesisError>>;

pub const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

#[derive(thiserror::Error, Debug)]
pub enum SynthesisError {
    #[error("request to synthesis service failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("synthesis service did not answer within {0:?}")]
    Timeout(std::time::Duration),

    #[error("synthesis service returned {0}")]
    Status(StatusCode),

    #[error("audio stream broke off: {0}")]
    Stream(String),
}

#[async_trait]
pub trait SynthesisProvider: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<AudioStream, SynthesisError>;
}
