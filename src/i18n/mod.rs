//! Language handling for localized accommodation content.
//!
//! # Architecture
//!
//! - `language`: `LanguageCode`, a validated two-letter code
//! - `detector`: the `LanguageDetector` seam and its HTTP backend
//! - `validator`: checks a submitted localization and produces the only value
//!   the store will persist
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crate::i18n::{HttpLanguageDetector, LocalizationValidator};
//!
//! let detector = HttpLanguageDetector::new("http://localhost:5000", None, 0.0);
//! let validator = LocalizationValidator::new(Arc::new(detector));
//! let validated = validator.validate(input).await?;
//! db.save_localization(&validated).await?;
//! ```

mod detector;
mod language;
mod validator;

pub use detector::{Detection, DetectionError, HttpLanguageDetector, LanguageDetector};
pub use language::LanguageCode;
pub use validator::LocalizationValidator;
