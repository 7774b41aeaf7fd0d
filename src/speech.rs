//! Speech-to-text client used by the transcription proxy.
//!
//! Forwards base64-encoded audio to the configured recognizer endpoint
//! (Google Cloud Speech by default) with a fixed recognition config:
//! WEBM_OPUS at the configured sample rate, automatic punctuation, and the
//! enhanced model. The API key is read from the environment variable named
//! in `[speech].api_key_env`; a missing key fails the request, not
//! process startup, so the rest of the gateway keeps serving.

use anyhow::{bail, Result};
use std::time::Duration;

use crate::config::SpeechConfig;

/// Client for the remote speech recognizer.
pub struct Transcriber {
    http: reqwest::Client,
    config: SpeechConfig,
    api_key: Option<String>,
}

impl Transcriber {
    /// Build a transcriber, resolving the API key from the environment.
    pub fn new(config: &SpeechConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        let api_key = std::env::var(&config.api_key_env).ok();
        Ok(Self {
            http,
            config: config.clone(),
            api_key,
        })
    }

    /// Override the resolved API key (used by tests and embedding hosts).
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Recognize base64-encoded audio and return the top transcript, or an
    /// empty string when the recognizer heard nothing.
    pub async fn transcribe_base64(&self, audio_content: &str) -> Result<String> {
        let api_key = match &self.api_key {
            Some(key) => key,
            None => bail!(
                "speech API key not set ({} environment variable)",
                self.config.api_key_env
            ),
        };

        let body = serde_json::json!({
            "config": {
                "encoding": "WEBM_OPUS",
                "sampleRateHertz": self.config.sample_rate_hertz,
                "languageCode": self.config.language_code,
                "model": "default",
                "enableAutomaticPunctuation": true,
                "useEnhanced": true,
            },
            "audio": { "content": audio_content },
        });

        let url = format!("{}?key={}", self.config.endpoint, api_key);
        let response = self.http.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            bail!("speech recognizer error {}: {}", status, detail);
        }

        let json: serde_json::Value = response.json().await?;
        Ok(extract_transcript(&json))
    }
}

/// Pull `results[0].alternatives[0].transcript` out of the recognizer
/// response; absent pieces mean silence, not an error.
fn extract_transcript(json: &serde_json::Value) -> String {
    json.get("results")
        .and_then(|r| r.get(0))
        .and_then(|r| r.get("alternatives"))
        .and_then(|a| a.get(0))
        .and_then(|a| a.get("transcript"))
        .and_then(|t| t.as_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_is_extracted_from_first_alternative() {
        let json = serde_json::json!({
            "results": [
                { "alternatives": [ { "transcript": "my tomato leaves are yellow", "confidence": 0.93 } ] }
            ]
        });
        assert_eq!(extract_transcript(&json), "my tomato leaves are yellow");
    }

    #[test]
    fn silence_yields_empty_transcript() {
        assert_eq!(extract_transcript(&serde_json::json!({})), "");
        assert_eq!(
            extract_transcript(&serde_json::json!({ "results": [] })),
            ""
        );
    }
}
