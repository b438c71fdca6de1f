//! Text-to-speech service client
//!
//! Sends narration text to a streaming TTS endpoint and collects the audio.
//! Any non-success response fails that one request only.

use crate::core::config::SpeechConfig;
use crate::core::error::{GameError, Result};
use crate::speech::controller::SpeechController;
use crate::speech::sink::{AudioClip, AudioSink};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const DEFAULT_TTS_URL: &str = "https://api.sws.speechify.com/v1/audio/stream";
const AUDIO_MPEG: &str = "audio/mpeg";

/// Anything that turns text into audio
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<AudioClip>;
}

/// Where the bearer token comes from
#[derive(Debug, Clone, PartialEq)]
pub enum TokenSource {
    /// Fixed API key
    Static(String),
    /// Endpoint returning `{"access_token": ...}`, fetched per request
    Endpoint(String),
}

/// HTTP client for the speech synthesis service
pub struct SpeechClient {
    client: Client,
    api_url: String,
    token: TokenSource,
    voice: SpeechConfig,
}

impl SpeechClient {
    pub fn new(api_url: String, token: TokenSource, voice: SpeechConfig) -> Self {
        Self {
            client: Client::new(),
            api_url,
            token,
            voice,
        }
    }

    /// Create a client from environment variables
    ///
    /// Required: TTS_API_KEY or TTS_TOKEN_URL
    /// Optional: TTS_API_URL (defaults to the Speechify stream endpoint)
    pub fn from_env(voice: SpeechConfig) -> Result<Self> {
        let token = match (std::env::var("TTS_API_KEY"), std::env::var("TTS_TOKEN_URL")) {
            (Ok(key), _) => TokenSource::Static(key),
            (_, Ok(url)) => TokenSource::Endpoint(url),
            _ => {
                return Err(GameError::SpeechError(
                    "TTS_API_KEY or TTS_TOKEN_URL not set".into(),
                ))
            }
        };
        let api_url = std::env::var("TTS_API_URL").unwrap_or_else(|_| DEFAULT_TTS_URL.into());

        Ok(Self::new(api_url, token, voice))
    }

    async fn bearer_token(&self) -> Result<String> {
        match &self.token {
            TokenSource::Static(key) => Ok(key.clone()),
            TokenSource::Endpoint(url) => {
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| GameError::SpeechError(e.to_string()))?;

                if !response.status().is_success() {
                    return Err(GameError::SpeechError(format!(
                        "Token endpoint returned {}",
                        response.status()
                    )));
                }

                let token: TokenResponse = response
                    .json()
                    .await
                    .map_err(|e| GameError::SpeechError(e.to_string()))?;
                Ok(token.access_token)
            }
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for SpeechClient {
    async fn synthesize(&self, text: &str) -> Result<AudioClip> {
        if text.trim().is_empty() {
            return Err(GameError::SpeechError("No input text provided.".into()));
        }

        let token = self.bearer_token().await?;
        let request = SpeechRequest {
            input: build_ssml(text, &self.voice.emotion),
            voice_id: self.voice.voice_id.clone(),
            model: self.voice.model.clone(),
            language: self.voice.language.clone(),
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", token))
            .header("content-type", "text/plain;charset=UTF-8")
            .header("accept", AUDIO_MPEG)
            .body(serde_json::to_string(&request)?)
            .send()
            .await
            .map_err(|e| GameError::SpeechError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(GameError::SpeechError(format!(
                "API error {}: {}",
                status, error_text
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(AUDIO_MPEG)
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| GameError::SpeechError(e.to_string()))?;

        if bytes.is_empty() {
            return Err(GameError::SpeechError("No audio stream received.".into()));
        }

        Ok(AudioClip::new(bytes.to_vec(), content_type))
    }
}

/// Start voicing `text` and wait for its audio
///
/// The controller ends up `Playing` on success and `Idle` on failure.
pub async fn speak<S, T>(
    controller: &mut SpeechController<S>,
    synthesizer: &T,
    text: &str,
) -> Result<()>
where
    S: AudioSink,
    T: SpeechSynthesizer + ?Sized,
{
    let ticket = controller.start(text);
    let audio = synthesizer.synthesize(text).await;
    controller.finish_generation(ticket, audio)
}

/// Wrap narration in the SSML envelope the service expects
pub fn build_ssml(text: &str, emotion: &str) -> String {
    format!(
        "<speak><speechify:emotion emotion=\"{}\">{}</speechify:emotion></speak>",
        escape_xml(emotion),
        escape_xml(text)
    )
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[derive(Serialize)]
struct SpeechRequest {
    input: String,
    voice_id: String,
    model: String,
    language: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}
