use std::time::Duration;

use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt};
use reqwest::header::{ACCEPT, HeaderValue};
use serde::Serialize;

use super::stream::{bounded_chunks, idle_bounded, AUDIO_CHUNK_SIZE};
use super::{AudioStream, SynthesisError, SynthesisProvider, AUDIO_CONTENT_TYPE};
use crate::config::{ElevenLabsConfig, VoiceSettings};

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

/// Client for the ElevenLabs text-to-speech endpoint of a single voice.
pub struct ElevenLabsClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model_id: String,
    voice_settings: VoiceSettings,
    timeout: Duration,
}

impl ElevenLabsClient {
    pub fn new(http: reqwest::Client, config: &ElevenLabsConfig, timeout: Duration) -> Self {
        let endpoint = format!(
            "{}/v1/text-to-speech/{}",
            config.base_url.trim_end_matches('/'),
            config.voice_id
        );
        Self {
            http,
            endpoint,
            api_key: config.api_key.clone(),
            model_id: config.model_id.clone(),
            voice_settings: config.voice_settings,
            timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SynthesisProvider for ElevenLabsClient {
    async fn synthesize(&self, text: &str) -> Result<AudioStream, SynthesisError> {
        let body = SpeechRequest {
            text,
            model_id: &self.model_id,
            voice_settings: self.voice_settings,
        };

        tracing::debug!("Synthesizing {} chars with {}", text.len(), self.model_id);

        let request = self
            .http
            .post(&self.endpoint)
            .header("xi-api-key", &self.api_key)
            .header(ACCEPT, HeaderValue::from_static(AUDIO_CONTENT_TYPE))
            .json(&body)
            .send();

        // Bounds the wait for headers; body reads are bounded one at a time below.
        let response = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| SynthesisError::Timeout(self.timeout))??;

        let status = response.status();
        if !status.is_success() {
            let detail = tokio::time::timeout(self.timeout, response.text())
                .await
                .ok()
                .and_then(Result::ok)
                .unwrap_or_default();
            tracing::warn!("ElevenLabs returned {}: {}", status, detail);
            return Err(SynthesisError::Status(status));
        }

        let audio = response
            .bytes_stream()
            .map_err(|e| SynthesisError::Stream(e.to_string()))
            .boxed();

        Ok(bounded_chunks(idle_bounded(audio, self.timeout), AUDIO_CHUNK_SIZE).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Path,
        http::{HeaderMap, StatusCode},
        routing::post,
        Json, Router,
    };

    fn config(base_url: String) -> ElevenLabsConfig {
        ElevenLabsConfig {
            api_key: "xi-secret".into(),
            base_url,
            voice_id: "voice-1".into(),
            model_id: "model-1".into(),
            voice_settings: VoiceSettings {
                stability: 0.25,
                similarity_boost: 0.5,
            },
        }
    }

    async fn spawn_upstream(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn request_body_has_expected_shape() {
        let body = SpeechRequest {
            text: "hello",
            model_id: "eleven_monolingual_v1",
            voice_settings: VoiceSettings::default(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "text": "hello",
                "model_id": "eleven_monolingual_v1",
                "voice_settings": {"stability": 0.5, "similarity_boost": 0.75}
            })
        );
    }

    #[test]
    fn endpoint_includes_voice() {
        let client = ElevenLabsClient::new(
            reqwest::Client::new(),
            &config("https://api.example.test".into()),
            Duration::from_secs(1),
        );
        assert_eq!(client.endpoint(), "https://api.example.test/v1/text-to-speech/voice-1");
    }

    #[tokio::test]
    async fn streams_upstream_audio_in_bounded_chunks() {
        let audio = vec![1u8; 9000];
        let served = audio.clone();
        let app = Router::new().route(
            "/v1/text-to-speech/:voice",
            post(
                move |Path(voice): Path<String>,
                      headers: HeaderMap,
                      Json(body): Json<serde_json::Value>| async move {
                    assert_eq!(voice, "voice-1");
                    assert_eq!(headers["xi-api-key"], "xi-secret");
                    assert_eq!(body["text"], "hello");
                    assert_eq!(body["model_id"], "model-1");
                    assert_eq!(body["voice_settings"]["stability"], 0.25);
                    served
                },
            ),
        );
        let base = spawn_upstream(app).await;
        let client = ElevenLabsClient::new(reqwest::Client::new(), &config(base), Duration::from_secs(5));

        let chunks: Vec<_> = client
            .synthesize("hello")
            .await
            .unwrap()
            .try_collect::<Vec<_>>()
            .await
            .unwrap();

        assert!(chunks.iter().all(|c| c.len() <= AUDIO_CHUNK_SIZE));
        let joined: Vec<u8> = chunks.iter().flat_map(|c| c.to_vec()).collect();
        assert_eq!(joined, audio);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let app = Router::new().route(
            "/v1/text-to-speech/:voice",
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
        );
        let base = spawn_upstream(app).await;
        let client = ElevenLabsClient::new(reqwest::Client::new(), &config(base), Duration::from_secs(5));

        match client.synthesize("hello").await {
            Err(SynthesisError::Status(s)) => assert_eq!(s, StatusCode::UNAUTHORIZED),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[tokio::test]
    async fn stalled_error_body_does_not_hang() {
        let app = Router::new().route(
            "/v1/text-to-speech/:voice",
            post(|| async {
                let never = futures_util::stream::pending::<Result<bytes::Bytes, std::io::Error>>();
                (StatusCode::UNAUTHORIZED, axum::body::Body::from_stream(never))
            }),
        );
        let base = spawn_upstream(app).await;
        let client =
            ElevenLabsClient::new(reqwest::Client::new(), &config(base), Duration::from_millis(200));

        let result = tokio::time::timeout(Duration::from_secs(3), client.synthesize("hello"))
            .await
            .expect("synthesize should give up on its own");
        assert!(matches!(result, Err(SynthesisError::Status(s)) if s == StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn stalled_audio_body_ends_with_timeout() {
        let app = Router::new().route(
            "/v1/text-to-speech/:voice",
            post(|| async {
                let first = futures_util::stream::iter([Ok::<_, std::io::Error>(
                    bytes::Bytes::from_static(b"ID3"),
                )]);
                let body = first.chain(futures_util::stream::pending());
                axum::body::Body::from_stream(body)
            }),
        );
        let base = spawn_upstream(app).await;
        let client =
            ElevenLabsClient::new(reqwest::Client::new(), &config(base), Duration::from_millis(200));

        let audio = client.synthesize("hello").await.unwrap();
        let items: Vec<_> = tokio::time::timeout(Duration::from_secs(3), audio.collect::<Vec<_>>())
            .await
            .expect("audio stream should end on its own");

        assert_eq!(items[0].as_ref().unwrap(), &bytes::Bytes::from_static(b"ID3"));
        assert!(matches!(items.last(), Some(Err(SynthesisError::Timeout(_)))));
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let app = Router::new().route(
            "/v1/text-to-speech/:voice",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
        let base = spawn_upstream(app).await;
        let client =
            ElevenLabsClient::new(reqwest::Client::new(), &config(base), Duration::from_millis(100));

        assert!(matches!(
            client.synthesize("hello").await,
            Err(SynthesisError::Timeout(_))
        ));
    }
}
