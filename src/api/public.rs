use axum::{extract::State, http::StatusCode, Json};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::OnceLock;
use tracing::info;

use super::extract::{AppForm, AppPath, AppQuery};
use super::SharedState;
use crate::access::OwnerScope;
use crate::db::AccommodationFilter;
use crate::error::{AppError, AppResult};
use crate::models::{AccommodationSummary, LocationSummary, PROPERTY_OWNERS_GROUP};
use crate::pagination::{PageEnvelope, Paginator};

pub async fn index() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Property Management System" }))
}

// ==================== Locations ====================

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    #[serde(rename = "type")]
    location_type: Option<String>,
    page: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LocationsPage {
    locations: Vec<LocationSummary>,
}

pub async fn location_list(
    State(state): State<SharedState>,
    AppQuery(query): AppQuery<LocationQuery>,
) -> AppResult<Json<PageEnvelope<LocationsPage>>> {
    let location_type = non_empty(query.location_type.as_deref());

    let total = state.db.count_locations(location_type).await?;
    let page = Paginator::new(total).resolve(query.page.as_deref());
    let locations = state
        .db
        .list_locations(location_type, page.limit, page.offset)
        .await?;

    Ok(Json(PageEnvelope::new(page, LocationsPage { locations })))
}

pub async fn location_children(
    State(state): State<SharedState>,
    AppPath(id): AppPath<String>,
) -> AppResult<Json<Value>> {
    let parent = state
        .db
        .get_location(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Location '{}'", id)))?;
    let children = state.db.list_children(&id).await?;

    Ok(Json(json!({ "parent": parent.title, "children": children })))
}

// ==================== Accommodations ====================

#[derive(Debug, Deserialize)]
pub struct AccommodationQuery {
    published: Option<String>,
    country: Option<String>,
    page: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AccommodationsPage {
    accommodations: Vec<AccommodationSummary>,
}

/// `published` is an integer flag: non-zero means published.
pub(super) fn parse_published(raw: Option<&str>) -> AppResult<Option<bool>> {
    raw.map(|value| {
        value
            .trim()
            .parse::<i64>()
            .map(|flag| flag != 0)
            .map_err(|_| {
                AppError::BadRequest(format!("published must be an integer, got '{}'", value))
            })
    })
    .transpose()
}

pub(super) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

pub async fn accommodation_list(
    State(state): State<SharedState>,
    AppQuery(query): AppQuery<AccommodationQuery>,
) -> AppResult<Json<PageEnvelope<AccommodationsPage>>> {
    let filter = AccommodationFilter {
        published: parse_published(query.published.as_deref())?,
        country: non_empty(query.country.as_deref()).map(str::to_string),
        feed: None,
    };

    let total = state
        .db
        .count_accommodations(&filter, OwnerScope::Everything)
        .await?;
    let page = Paginator::new(total).resolve(query.page.as_deref());
    let accommodations = state
        .db
        .list_accommodations(&filter, OwnerScope::Everything, page.limit, page.offset)
        .await?
        .into_iter()
        .map(AccommodationSummary::from)
        .collect();

    Ok(Json(PageEnvelope::new(
        page,
        AccommodationsPage { accommodations },
    )))
}

pub async fn accommodations_by_user(
    State(state): State<SharedState>,
    AppPath(user_id): AppPath<i64>,
) -> AppResult<Json<Value>> {
    let accommodations = state.db.accommodations_by_user(user_id).await?;
    Ok(Json(json!({ "user_accommodations": accommodations })))
}

// ==================== Sign-up ====================

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

fn required(value: Option<String>, field: &str) -> AppResult<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::MissingField(field.to_string()))
}

fn check_signup_fields(username: &str, email: &str) -> AppResult<()> {
    let username_regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[\w.@+-]{1,150}$").expect("Invalid username regex"));
    if !username_regex.is_match(username) {
        return Err(AppError::BadRequest(
            "Username may contain only letters, numbers and @/./+/-/_ characters.".to_string(),
        ));
    }

    let email_regex = EMAIL_REGEX
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid email regex"));
    if !email_regex.is_match(email) {
        return Err(AppError::BadRequest("Enter a valid email address.".to_string()));
    }

    Ok(())
}

/// Register a property owner account.
pub async fn signup(
    State(state): State<SharedState>,
    AppForm(form): AppForm<SignupForm>,
) -> AppResult<(StatusCode, &'static str)> {
    let username = required(form.username, "username")?;
    let email = required(form.email, "email")?;
    let password = required(form.password, "password")?;
    check_signup_fields(&username, &email)?;

    let user = state.db.create_user(&username, &email, &password).await?;
    let group_id = state.db.get_or_create_group(PROPERTY_OWNERS_GROUP).await?;
    state.db.add_user_to_group(user.id, group_id).await?;

    info!("New property owner signed up: {}", user.username);
    Ok((
        StatusCode::OK,
        "Sign-up successful! You are now a Property Owner.",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_published() {
        assert_eq!(parse_published(None).expect("none"), None);
        assert_eq!(parse_published(Some("1")).expect("one"), Some(true));
        assert_eq!(parse_published(Some("0")).expect("zero"), Some(false));
        assert_eq!(parse_published(Some("2")).expect("two"), Some(true));
        assert!(matches!(
            parse_published(Some("yes")),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("US")), Some("US"));
        assert_eq!(non_empty(Some("")), None);
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn test_required_fields() {
        assert_eq!(required(Some("x".into()), "username").expect("ok"), "x");
        assert!(matches!(
            required(None, "email"),
            Err(AppError::MissingField(ref f)) if f == "email"
        ));
        assert!(required(Some(String::new()), "password").is_err());
    }

    #[test]
    fn test_check_signup_fields() {
        assert!(check_signup_fields("owner.one", "owner@example.com").is_ok());
        assert!(check_signup_fields("bad name", "owner@example.com").is_err());
        assert!(check_signup_fields("owner", "not-an-email").is_err());
    }
}
