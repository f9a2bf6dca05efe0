//! Language detection backends.
//!
//! The validator only depends on the [`LanguageDetector`] trait. The production
//! backend talks to a LibreTranslate-compatible `/detect` endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("Text is empty")]
    EmptyText,

    #[error("No language could be detected")]
    NoCandidate,

    #[error("Best guess '{language}' is below the confidence threshold ({confidence})")]
    LowConfidence { language: String, confidence: f64 },

    #[error("Language detection service error: {0}")]
    Service(String),
}

/// The best language guess for a piece of text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Detection {
    pub language: String,
    pub confidence: f64,
}

#[async_trait]
pub trait LanguageDetector: Send + Sync {
    /// Return the most likely language of `text`.
    async fn detect(&self, text: &str) -> Result<Detection, DetectionError>;
}

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    q: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

/// Detector backed by an HTTP language detection service.
pub struct HttpLanguageDetector {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    min_confidence: f64,
}

impl HttpLanguageDetector {
    pub fn new(base_url: &str, api_key: Option<String>, min_confidence: f64) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            min_confidence,
        }
    }
}

#[async_trait]
impl LanguageDetector for HttpLanguageDetector {
    async fn detect(&self, text: &str) -> Result<Detection, DetectionError> {
        if text.trim().is_empty() {
            return Err(DetectionError::EmptyText);
        }

        let request = DetectRequest {
            q: text,
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/detect", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| DetectionError::Service(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DetectionError::Service(format!("{}: {}", status, body)));
        }

        let candidates: Vec<Detection> = response
            .json()
            .await
            .map_err(|e| DetectionError::Service(format!("invalid response: {}", e)))?;

        let best = candidates
            .into_iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
            .ok_or(DetectionError::NoCandidate)?;

        debug!(
            "Detected language '{}' with confidence {}",
            best.language, best.confidence
        );

        if best.confidence < self.min_confidence {
            return Err(DetectionError::LowConfidence {
                language: best.language,
                confidence: best.confidence,
            });
        }

        Ok(best)
    }
}
