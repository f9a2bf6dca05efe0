//! Domain records and their API projections.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::point::Point;

/// Name of the group every self-registered account joins.
pub const PROPERTY_OWNERS_GROUP: &str = "Property Owners";

// ==================== Locations ====================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub id: String,
    pub title: String,
    pub center: Point,
    pub location_type: String,
    pub country_code: String,
    pub state_abbr: String,
    pub city: String,
    pub parent_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// The writable fields of a location, keyed by `id`.
///
/// The parent link is managed separately so that bulk upserts never detach a
/// location from its tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocationRecord {
    pub id: String,
    pub title: String,
    pub center: Point,
    pub location_type: String,
    pub country_code: String,
    pub state_abbr: String,
    pub city: String,
}

impl LocationRecord {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_required("id", &self.id)?;
        check_length("id", &self.id, 20)?;
        check_length("title", &self.title, 100)?;
        check_length("location_type", &self.location_type, 20)?;
        check_length("country_code", &self.country_code, 2)?;
        check_length("state_abbr", &self.state_abbr, 3)?;
        check_length("city", &self.city, 30)?;
        Ok(())
    }
}

/// Projection used by the public location endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LocationSummary {
    pub id: String,
    pub title: String,
    pub location_type: String,
    pub country_code: String,
    pub city: String,
}

// ==================== Accommodations ====================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Accommodation {
    pub id: String,
    pub feed: u16,
    pub title: String,
    pub country_code: String,
    pub bedroom_count: u32,
    pub review_score: BigDecimal,
    pub usd_rate: BigDecimal,
    pub center: Point,
    pub images: Value,
    pub location_id: String,
    pub amenities: Value,
    pub user_id: Option<i64>,
    pub published: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// The writable fields of an accommodation, keyed by `id`.
///
/// `id` may be omitted from a request body when the route already names it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccommodationRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub feed: u16,
    pub title: String,
    pub country_code: String,
    pub bedroom_count: u32,
    #[serde(default = "zero")]
    pub review_score: BigDecimal,
    pub usd_rate: BigDecimal,
    pub center: Point,
    pub images: Value,
    pub location_id: String,
    pub amenities: Value,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub published: bool,
}

fn zero() -> BigDecimal {
    BigDecimal::from(0)
}

impl AccommodationRecord {
    /// Check field bounds and normalise the fixed-point columns.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        check_required("id", &self.id)?;
        check_length("id", &self.id, 20)?;
        check_length("title", &self.title, 100)?;
        check_length("country_code", &self.country_code, 2)?;
        check_required("location_id", &self.location_id)?;
        self.review_score = fixed_point("review_score", &self.review_score, 3, 1)?;
        self.usd_rate = fixed_point("usd_rate", &self.usd_rate, 10, 2)?;
        Ok(())
    }
}

/// Projection used by the public accommodation endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccommodationSummary {
    pub id: String,
    pub title: String,
    pub country_code: String,
    pub bedroom_count: u32,
    pub usd_rate: BigDecimal,
    pub published: bool,
}

impl From<Accommodation> for AccommodationSummary {
    fn from(a: Accommodation) -> Self {
        Self {
            id: a.id,
            title: a.title,
            country_code: a.country_code,
            bedroom_count: a.bedroom_count,
            usd_rate: a.usd_rate,
            published: a.published,
        }
    }
}

// ==================== Localizations ====================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalizedAccommodation {
    pub id: i64,
    pub accommodation_id: String,
    pub language: String,
    pub description: String,
    pub policy: Map<String, Value>,
}

impl LocalizedAccommodation {
    /// First 50 characters of the description, with an ellipsis when cut.
    pub fn description_short(&self) -> String {
        if self.description.chars().count() > 50 {
            let head: String = self.description.chars().take(50).collect();
            format!("{}...", head)
        } else {
            self.description.clone()
        }
    }
}

/// An unvalidated localization as submitted by a client.
///
/// `policy` stays a raw JSON value until the validator has checked its shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocalizationInput {
    pub accommodation_id: String,
    pub language: String,
    pub description: String,
    pub policy: Value,
}

// ==================== Users ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_superuser: bool,
    pub date_joined: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashMessage {
    pub level: String,
    pub message: String,
}

// ==================== Field checks ====================

fn check_required(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(field, "This field cannot be blank."));
    }
    Ok(())
}

fn check_length(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::new(
            field,
            format!(
                "Ensure this value has at most {} characters (it has {}).",
                max, len
            ),
        ));
    }
    Ok(())
}

/// Validate a decimal against `max_digits` / `scale` and return it at that scale.
fn fixed_point(
    field: &str,
    value: &BigDecimal,
    max_digits: u32,
    scale: i64,
) -> Result<BigDecimal, ValidationError> {
    let (_, places) = value.normalized().as_bigint_and_exponent();
    if places > scale {
        return Err(ValidationError::new(
            field,
            format!("Ensure that there are no more than {} decimal places.", scale),
        ));
    }

    let limit = BigDecimal::from(10i64.pow(max_digits - scale as u32));
    if value.abs() >= limit {
        return Err(ValidationError::new(
            field,
            format!(
                "Ensure that there are no more than {} digits in total.",
                max_digits
            ),
        ));
    }

    Ok(value.with_scale(scale))
}
