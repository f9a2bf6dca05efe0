//! Language-conformance validation for localized accommodations.
//!
//! A localization is only storable once its description and every policy value
//! have been detected as written in the declared language. Passing validation is
//! the only way to obtain a [`ValidatedLocalization`].

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::warn;

use super::detector::LanguageDetector;
use super::language::LanguageCode;
use crate::db::ValidatedLocalization;
use crate::error::ValidationError;
use crate::models::LocalizationInput;

const DETECTION_FAILED: &str = "Language detection failed. Please ensure the text is valid.";

/// What a single text check concluded.
enum TextCheck {
    Matches,
    Mismatch,
    DetectionFailed,
}

#[derive(Clone)]
pub struct LocalizationValidator {
    detector: Arc<dyn LanguageDetector>,
}

impl LocalizationValidator {
    pub fn new(detector: Arc<dyn LanguageDetector>) -> Self {
        Self { detector }
    }

    /// Check a submitted localization and turn it into a storable value.
    ///
    /// Stops at the first failing field (description first, then policy keys in
    /// order).
    pub async fn validate(
        &self,
        input: LocalizationInput,
    ) -> Result<ValidatedLocalization, ValidationError> {
        let language = LanguageCode::parse(&input.language)?;

        match self.check_text(&input.description, &language).await {
            TextCheck::Matches => {}
            TextCheck::Mismatch => {
                return Err(ValidationError::new(
                    "description",
                    format!(
                        "The description must be written in {}.",
                        language.display_upper()
                    ),
                ));
            }
            TextCheck::DetectionFailed => {
                return Err(ValidationError::new("description", DETECTION_FAILED));
            }
        }

        let policy = self.check_policy(input.policy, &language).await?;

        Ok(ValidatedLocalization::new(
            input.accommodation_id,
            language.to_string(),
            input.description,
            policy,
        ))
    }

    async fn check_policy(
        &self,
        policy: Value,
        language: &LanguageCode,
    ) -> Result<Map<String, Value>, ValidationError> {
        let Value::Object(policy) = policy else {
            return Err(ValidationError::new(
                "policy",
                "Policy must be a valid JSON object.",
            ));
        };

        for (key, value) in &policy {
            let Some(text) = value.as_str() else {
                return Err(ValidationError::for_key(
                    "policy",
                    key,
                    format!("Policy value for '{}' must be a string.", key),
                ));
            };

            match self.check_text(text, language).await {
                TextCheck::Matches => {}
                TextCheck::Mismatch => {
                    return Err(ValidationError::for_key(
                        "policy",
                        key,
                        format!(
                            "Policy value for '{}' must be written in {}.",
                            key,
                            language.display_upper()
                        ),
                    ));
                }
                TextCheck::DetectionFailed => {
                    return Err(ValidationError::for_key(
                        "policy",
                        key,
                        format!(
                            "Language detection failed for policy value '{}'. Please ensure the text is valid.",
                            key
                        ),
                    ));
                }
            }
        }

        Ok(policy)
    }

    async fn check_text(&self, text: &str, language: &LanguageCode) -> TextCheck {
        match self.detector.detect(text).await {
            Ok(detection) if detection.language.eq_ignore_ascii_case(language.as_str()) => {
                TextCheck::Matches
            }
            Ok(detection) => {
                warn!(
                    "Expected language '{}' but detected '{}'",
                    language, detection.language
                );
                TextCheck::Mismatch
            }
            Err(e) => {
                warn!("Language detection failed: {}", e);
                TextCheck::DetectionFailed
            }
        }
    }
}
