use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{FromRow, QueryBuilder, Sqlite};

use super::Database;
use crate::access::OwnerScope;
use crate::error::{AppError, AppResult};
use crate::models::LocalizedAccommodation;

/// A localization whose text has passed language validation.
///
/// Only the validator can build one, so the store never sees unchecked text.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedLocalization {
    accommodation_id: String,
    language: String,
    description: String,
    policy: Map<String, Value>,
}

impl ValidatedLocalization {
    pub(crate) fn new(
        accommodation_id: String,
        language: String,
        description: String,
        policy: Map<String, Value>,
    ) -> Self {
        Self {
            accommodation_id,
            language,
            description,
            policy,
        }
    }

    pub fn accommodation_id(&self) -> &str {
        &self.accommodation_id
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn policy(&self) -> &Map<String, Value> {
        &self.policy
    }
}

#[derive(FromRow)]
struct LocalizationRow {
    id: i64,
    accommodation_id: String,
    language: String,
    description: String,
    policy: Json<Map<String, Value>>,
    owner_id: Option<i64>,
}

impl LocalizationRow {
    fn split(self) -> (LocalizedAccommodation, Option<i64>) {
        (
            LocalizedAccommodation {
                id: self.id,
                accommodation_id: self.accommodation_id,
                language: self.language,
                description: self.description,
                policy: self.policy.0,
            },
            self.owner_id,
        )
    }
}

const LOCALIZATION_SELECT: &str = "SELECT la.id, la.accommodation_id, la.language, la.description, \
     la.policy, a.user_id AS owner_id \
     FROM localized_accommodations la \
     INNER JOIN accommodations a ON a.id = la.accommodation_id";

impl Database {
    /// Insert or replace the localization for (accommodation, language).
    pub async fn save_localization(
        &self,
        localization: &ValidatedLocalization,
    ) -> AppResult<LocalizedAccommodation> {
        sqlx::query(
            "INSERT INTO localized_accommodations (accommodation_id, language, description, policy)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(accommodation_id, language) DO UPDATE SET
                description = excluded.description,
                policy = excluded.policy",
        )
        .bind(localization.accommodation_id())
        .bind(localization.language())
        .bind(localization.description())
        .bind(Json(localization.policy()))
        .execute(&self.pool)
        .await?;

        self.find_localization(localization.accommodation_id(), localization.language())
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Localization {}/{}",
                    localization.accommodation_id(),
                    localization.language()
                ))
            })
    }

    /// Insert a new localization. An existing (accommodation, language) pair is a `Conflict`.
    pub async fn create_localization(
        &self,
        localization: &ValidatedLocalization,
    ) -> AppResult<LocalizedAccommodation> {
        let id = sqlx::query(
            "INSERT INTO localized_accommodations (accommodation_id, language, description, policy)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(localization.accommodation_id())
        .bind(localization.language())
        .bind(localization.description())
        .bind(Json(localization.policy()))
        .execute(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::Conflict(format!(
                "Accommodation {} already has a '{}' localization",
                localization.accommodation_id(),
                localization.language()
            )),
            other => other,
        })?
        .last_insert_rowid();

        self.get_localization(id)
            .await?
            .map(|(localization, _)| localization)
            .ok_or_else(|| AppError::NotFound(format!("Localization {}", id)))
    }

    async fn find_localization(
        &self,
        accommodation_id: &str,
        language: &str,
    ) -> AppResult<Option<LocalizedAccommodation>> {
        let row = sqlx::query_as::<_, LocalizationRow>(&format!(
            "{} WHERE la.accommodation_id = ?1 AND la.language = ?2",
            LOCALIZATION_SELECT
        ))
        .bind(accommodation_id)
        .bind(language)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.split().0))
    }

    /// Fetch a localization together with the owner of its accommodation.
    pub async fn get_localization(
        &self,
        id: i64,
    ) -> AppResult<Option<(LocalizedAccommodation, Option<i64>)>> {
        let row = sqlx::query_as::<_, LocalizationRow>(&format!(
            "{} WHERE la.id = ?1",
            LOCALIZATION_SELECT
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(LocalizationRow::split))
    }

    /// Localizations whose accommodation falls within `scope`, ordered by id.
    pub async fn list_localizations(
        &self,
        scope: OwnerScope,
        language: Option<&str>,
    ) -> AppResult<Vec<LocalizedAccommodation>> {
        let mut builder =
            QueryBuilder::<Sqlite>::new(format!("{} WHERE 1 = 1", LOCALIZATION_SELECT));
        if let Some(language) = language {
            builder.push(" AND la.language = ").push_bind(language.to_string());
        }
        if let OwnerScope::OwnedBy(user_id) = scope {
            builder.push(" AND a.user_id = ").push_bind(user_id);
        }
        builder.push(" ORDER BY la.id ASC");

        let rows = builder
            .build_query_as::<LocalizationRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.split().0).collect())
    }

    pub async fn delete_localization(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM localized_accommodations WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
