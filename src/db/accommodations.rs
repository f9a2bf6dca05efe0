use bigdecimal::BigDecimal;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{FromRow, QueryBuilder, Sqlite};
use std::str::FromStr;

use super::{now, Database};
use crate::access::OwnerScope;
use crate::error::AppResult;
use crate::models::{Accommodation, AccommodationRecord, AccommodationSummary};
use crate::point::Point;

/// Optional filters shared by the public and admin listings. `None` means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccommodationFilter {
    pub published: Option<bool>,
    pub country: Option<String>,
    pub feed: Option<u16>,
}

#[derive(FromRow)]
struct AccommodationRow {
    id: String,
    feed: i64,
    title: String,
    country_code: String,
    bedroom_count: i64,
    review_score: String,
    usd_rate: String,
    center_lon: f64,
    center_lat: f64,
    images: Json<Value>,
    location_id: String,
    amenities: Json<Value>,
    user_id: Option<i64>,
    published: bool,
    created_at: String,
    updated_at: String,
}

impl TryFrom<AccommodationRow> for Accommodation {
    type Error = sqlx::Error;

    fn try_from(row: AccommodationRow) -> Result<Self, Self::Error> {
        Ok(Accommodation {
            id: row.id,
            feed: u16::try_from(row.feed).map_err(|e| decode_error("feed", e))?,
            title: row.title,
            country_code: row.country_code,
            bedroom_count: u32::try_from(row.bedroom_count)
                .map_err(|e| decode_error("bedroom_count", e))?,
            review_score: BigDecimal::from_str(&row.review_score)
                .map_err(|e| decode_error("review_score", e))?,
            usd_rate: BigDecimal::from_str(&row.usd_rate)
                .map_err(|e| decode_error("usd_rate", e))?,
            center: Point::new(row.center_lon, row.center_lat),
            images: row.images.0,
            location_id: row.location_id,
            amenities: row.amenities.0,
            user_id: row.user_id,
            published: row.published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn decode_error<E>(column: &str, source: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(source),
    }
}

const ACCOMMODATION_COLUMNS: &str = "id, feed, title, country_code, bedroom_count, review_score, \
     usd_rate, center_lon, center_lat, images, location_id, amenities, user_id, published, \
     created_at, updated_at";

fn push_filters(
    builder: &mut QueryBuilder<'_, Sqlite>,
    filter: &AccommodationFilter,
    scope: OwnerScope,
) {
    if let Some(published) = filter.published {
        builder.push(" AND published = ").push_bind(published);
    }
    if let Some(country) = &filter.country {
        builder.push(" AND country_code = ").push_bind(country.clone());
    }
    if let Some(feed) = filter.feed {
        builder.push(" AND feed = ").push_bind(i64::from(feed));
    }
    if let OwnerScope::OwnedBy(user_id) = scope {
        builder.push(" AND user_id = ").push_bind(user_id);
    }
}

impl Database {
    /// Create or replace an accommodation keyed by `id`.
    ///
    /// Returns `true` when a new row was inserted.
    pub async fn upsert_accommodation(&self, record: &AccommodationRecord) -> AppResult<bool> {
        let mut record = record.clone();
        record.validate()?;

        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM accommodations WHERE id = ?1")
                .bind(&record.id)
                .fetch_one(&self.pool)
                .await?;

        let timestamp = now();
        sqlx::query(
            "INSERT INTO accommodations (id, feed, title, country_code, bedroom_count, review_score,
                                         usd_rate, center_lon, center_lat, images, location_id,
                                         amenities, user_id, published, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?15)
             ON CONFLICT(id) DO UPDATE SET
                feed = excluded.feed,
                title = excluded.title,
                country_code = excluded.country_code,
                bedroom_count = excluded.bedroom_count,
                review_score = excluded.review_score,
                usd_rate = excluded.usd_rate,
                center_lon = excluded.center_lon,
                center_lat = excluded.center_lat,
                images = excluded.images,
                location_id = excluded.location_id,
                amenities = excluded.amenities,
                user_id = excluded.user_id,
                published = excluded.published,
                updated_at = excluded.updated_at",
        )
        .bind(&record.id)
        .bind(i64::from(record.feed))
        .bind(&record.title)
        .bind(&record.country_code)
        .bind(i64::from(record.bedroom_count))
        .bind(record.review_score.to_string())
        .bind(record.usd_rate.to_string())
        .bind(record.center.x)
        .bind(record.center.y)
        .bind(Json(&record.images))
        .bind(&record.location_id)
        .bind(Json(&record.amenities))
        .bind(record.user_id)
        .bind(record.published)
        .bind(&timestamp)
        .execute(&self.pool)
        .await?;

        Ok(existing == 0)
    }

    pub async fn get_accommodation(&self, id: &str) -> AppResult<Option<Accommodation>> {
        let row = sqlx::query_as::<_, AccommodationRow>(&format!(
            "SELECT {} FROM accommodations WHERE id = ?1",
            ACCOMMODATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Accommodation::try_from).transpose()?)
    }

    pub async fn count_accommodations(
        &self,
        filter: &AccommodationFilter,
        scope: OwnerScope,
    ) -> AppResult<i64> {
        let mut builder =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM accommodations WHERE 1 = 1");
        push_filters(&mut builder, filter, scope);

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// One page of accommodations matching `filter` within `scope`, ordered by `id`.
    pub async fn list_accommodations(
        &self,
        filter: &AccommodationFilter,
        scope: OwnerScope,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Accommodation>> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM accommodations WHERE 1 = 1",
            ACCOMMODATION_COLUMNS
        ));
        push_filters(&mut builder, filter, scope);
        builder
            .push(" ORDER BY id ASC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = builder
            .build_query_as::<AccommodationRow>()
            .fetch_all(&self.pool)
            .await?;
        let accommodations = rows
            .into_iter()
            .map(Accommodation::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(accommodations)
    }

    /// Summaries of every accommodation owned by `user_id`, ordered by `id`.
    pub async fn accommodations_by_user(&self, user_id: i64) -> AppResult<Vec<AccommodationSummary>> {
        let accommodations = self
            .list_accommodations(
                &AccommodationFilter::default(),
                OwnerScope::OwnedBy(user_id),
                -1,
                0,
            )
            .await?;

        Ok(accommodations
            .into_iter()
            .map(AccommodationSummary::from)
            .collect())
    }

    /// Delete an accommodation and, through the cascade, its localizations.
    pub async fn delete_accommodation(&self, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM accommodations WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::models::LocationRecord;

    pub fn location(id: &str, country_code: &str) -> LocationRecord {
        LocationRecord {
            id: id.to_string(),
            title: format!("Location {}", id),
            center: Point::new(10.0, 20.0),
            location_type: "city".to_string(),
            country_code: country_code.to_string(),
            state_abbr: "CA".to_string(),
            city: "San Francisco".to_string(),
        }
    }

    pub fn accommodation(
        id: &str,
        location_id: &str,
        country_code: &str,
        published: bool,
        user_id: Option<i64>,
    ) -> AccommodationRecord {
        AccommodationRecord {
            id: id.to_string(),
            feed: 0,
            title: format!("Accommodation {}", id),
            country_code: country_code.to_string(),
            bedroom_count: 2,
            review_score: BigDecimal::from_str("4.5").expect("decimal"),
            usd_rate: BigDecimal::from_str("150").expect("decimal"),
            center: Point::new(11.0, 21.0),
            images: serde_json::json!({"image1": "https://example.com/image1.jpg"}),
            location_id: location_id.to_string(),
            amenities: serde_json::json!({"wifi": true, "pool": false}),
            user_id,
            published,
        }
    }
}
