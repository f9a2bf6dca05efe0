use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Redirect,
    Json,
};
use serde::Deserialize;

use super::extract::{AppJson, AppPath, AppQuery};
use super::public::{non_empty, parse_published};
use super::{AdminPrincipal, SharedState};
use crate::admin::{self, AccommodationForm, LocalizationListItem, LocationForm, LocationOverview};
use crate::db::AccommodationFilter;
use crate::error::{AppError, AppResult};
use crate::models::{AccommodationRecord, LocalizationInput, LocalizedAccommodation, Location};

const CSV_FIELD: &str = "csv_file";

// ==================== Locations ====================

pub async fn location_overview(
    State(state): State<SharedState>,
    AdminPrincipal(principal): AdminPrincipal,
) -> AppResult<Json<LocationOverview>> {
    Ok(Json(admin::location_overview(&state.db, &principal).await?))
}

/// Accept a multipart upload with a `csv_file` field and redirect back to the list.
pub async fn import_csv(
    State(state): State<SharedState>,
    AdminPrincipal(principal): AdminPrincipal,
    mut multipart: Multipart,
) -> AppResult<Redirect> {
    let mut file_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() == Some(CSV_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Read error: {}", e)))?;
            file_data = Some(bytes.to_vec());
        }
    }

    let bytes = file_data.ok_or_else(|| AppError::MissingField(CSV_FIELD.to_string()))?;
    admin::import_locations_csv(&state.db, &principal, &bytes).await?;

    Ok(Redirect::to("/admin/locations/"))
}

pub async fn location_detail(
    State(state): State<SharedState>,
    AdminPrincipal(_principal): AdminPrincipal,
    AppPath(id): AppPath<String>,
) -> AppResult<Json<Location>> {
    Ok(Json(admin::get_location(&state.db, &id).await?))
}

/// 201 when the location was created, 200 when it was updated.
pub async fn location_save(
    State(state): State<SharedState>,
    AdminPrincipal(principal): AdminPrincipal,
    AppPath(id): AppPath<String>,
    AppJson(form): AppJson<LocationForm>,
) -> AppResult<(StatusCode, Json<Location>)> {
    let saved = admin::save_location(&state.db, &principal, &id, form).await?;
    let status = if saved.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(saved.location)))
}

pub async fn location_delete(
    State(state): State<SharedState>,
    AdminPrincipal(principal): AdminPrincipal,
    AppPath(id): AppPath<String>,
) -> AppResult<StatusCode> {
    admin::delete_location(&state.db, &principal, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ==================== Accommodations ====================

#[derive(Debug, Deserialize)]
pub struct AdminAccommodationQuery {
    published: Option<String>,
    country: Option<String>,
    feed: Option<u16>,
}

pub async fn accommodation_list(
    State(state): State<SharedState>,
    AdminPrincipal(principal): AdminPrincipal,
    AppQuery(query): AppQuery<AdminAccommodationQuery>,
) -> AppResult<Json<Vec<AccommodationForm>>> {
    let filter = AccommodationFilter {
        published: parse_published(query.published.as_deref())?,
        country: non_empty(query.country.as_deref()).map(str::to_string),
        feed: query.feed,
    };

    let accommodations = admin::list_accommodations(&state.db, &principal, &filter)
        .await?
        .into_iter()
        .map(|a| AccommodationForm::for_principal(&principal, a))
        .collect();

    Ok(Json(accommodations))
}

pub async fn accommodation_detail(
    State(state): State<SharedState>,
    AdminPrincipal(principal): AdminPrincipal,
    AppPath(id): AppPath<String>,
) -> AppResult<Json<AccommodationForm>> {
    Ok(Json(
        admin::get_accommodation(&state.db, &principal, &id).await?,
    ))
}

/// 201 when the accommodation was created, 200 when it was updated.
pub async fn accommodation_save(
    State(state): State<SharedState>,
    AdminPrincipal(principal): AdminPrincipal,
    AppPath(id): AppPath<String>,
    AppJson(record): AppJson<AccommodationRecord>,
) -> AppResult<(StatusCode, Json<AccommodationForm>)> {
    let saved = admin::save_accommodation(&state.db, &principal, &id, record).await?;
    let status = if saved.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(saved.accommodation)))
}

pub async fn accommodation_delete(
    State(state): State<SharedState>,
    AdminPrincipal(principal): AdminPrincipal,
    AppPath(id): AppPath<String>,
) -> AppResult<StatusCode> {
    admin::delete_accommodation(&state.db, &principal, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ==================== Localizations ====================

#[derive(Debug, Deserialize)]
pub struct LocalizationQuery {
    language: Option<String>,
}

pub async fn localization_list(
    State(state): State<SharedState>,
    AdminPrincipal(principal): AdminPrincipal,
    AppQuery(query): AppQuery<LocalizationQuery>,
) -> AppResult<Json<Vec<LocalizationListItem>>> {
    let language = non_empty(query.language.as_deref());
    Ok(Json(
        admin::list_localizations(&state.db, &principal, language).await?,
    ))
}

pub async fn localization_save(
    State(state): State<SharedState>,
    AdminPrincipal(principal): AdminPrincipal,
    AppJson(input): AppJson<LocalizationInput>,
) -> AppResult<Json<LocalizedAccommodation>> {
    let saved = admin::save_localization(&state.db, &state.validator, &principal, input).await?;
    Ok(Json(saved))
}

pub async fn localization_detail(
    State(state): State<SharedState>,
    AdminPrincipal(principal): AdminPrincipal,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<LocalizedAccommodation>> {
    Ok(Json(
        admin::get_localization(&state.db, &principal, id).await?,
    ))
}

pub async fn localization_delete(
    State(state): State<SharedState>,
    AdminPrincipal(principal): AdminPrincipal,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    admin::delete_localization(&state.db, &principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
