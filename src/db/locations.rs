use sqlx::FromRow;

use super::{now, Database};
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::{Location, LocationRecord, LocationSummary};
use crate::point::Point;

#[derive(FromRow)]
struct LocationRow {
    id: String,
    title: String,
    center_lon: f64,
    center_lat: f64,
    parent_id: Option<String>,
    location_type: String,
    country_code: String,
    state_abbr: String,
    city: String,
    created_at: String,
    updated_at: String,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Location {
            id: row.id,
            title: row.title,
            center: Point::new(row.center_lon, row.center_lat),
            location_type: row.location_type,
            country_code: row.country_code,
            state_abbr: row.state_abbr,
            city: row.city,
            parent_id: row.parent_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const LOCATION_COLUMNS: &str = "id, title, center_lon, center_lat, parent_id, location_type, \
                                country_code, state_abbr, city, created_at, updated_at";

const SUMMARY_COLUMNS: &str = "id, title, location_type, country_code, city";

impl Database {
    /// Create or replace a location keyed by `id`.
    ///
    /// An existing row keeps its `parent_id` and `created_at`.
    /// Returns `true` when a new row was inserted.
    pub async fn upsert_location(&self, record: &LocationRecord) -> AppResult<bool> {
        record.validate()?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM locations WHERE id = ?1")
            .bind(&record.id)
            .fetch_one(&self.pool)
            .await?;

        let timestamp = now();
        sqlx::query(
            "INSERT INTO locations (id, title, center_lon, center_lat, location_type,
                                    country_code, state_abbr, city, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                center_lon = excluded.center_lon,
                center_lat = excluded.center_lat,
                location_type = excluded.location_type,
                country_code = excluded.country_code,
                state_abbr = excluded.state_abbr,
                city = excluded.city,
                updated_at = excluded.updated_at",
        )
        .bind(&record.id)
        .bind(&record.title)
        .bind(record.center.x)
        .bind(record.center.y)
        .bind(&record.location_type)
        .bind(&record.country_code)
        .bind(&record.state_abbr)
        .bind(&record.city)
        .bind(&timestamp)
        .execute(&self.pool)
        .await?;

        Ok(existing == 0)
    }

    /// Attach a location to a parent, or detach it with `None`.
    pub async fn set_location_parent(&self, id: &str, parent_id: Option<&str>) -> AppResult<()> {
        if parent_id == Some(id) {
            return Err(
                ValidationError::new("parent_id", "A location cannot be its own parent.").into(),
            );
        }

        let result =
            sqlx::query("UPDATE locations SET parent_id = ?1, updated_at = ?2 WHERE id = ?3")
                .bind(parent_id)
                .bind(now())
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Location '{}'", id)));
        }
        Ok(())
    }

    pub async fn get_location(&self, id: &str) -> AppResult<Option<Location>> {
        let row = sqlx::query_as::<_, LocationRow>(&format!(
            "SELECT {} FROM locations WHERE id = ?1",
            LOCATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Location::from))
    }

    /// Count locations, optionally restricted to one `location_type`.
    pub async fn count_locations(&self, location_type: Option<&str>) -> AppResult<i64> {
        let mut sql = "SELECT COUNT(*) FROM locations WHERE 1 = 1".to_string();
        if location_type.is_some() {
            sql.push_str(" AND location_type = ?");
        }

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        if let Some(t) = location_type {
            query = query.bind(t);
        }
        Ok(query.fetch_one(&self.pool).await?)
    }

    /// One page of location summaries ordered by `id`.
    pub async fn list_locations(
        &self,
        location_type: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<LocationSummary>> {
        let mut sql = format!("SELECT {} FROM locations WHERE 1 = 1", SUMMARY_COLUMNS);
        if location_type.is_some() {
            sql.push_str(" AND location_type = ?");
        }
        sql.push_str(" ORDER BY id ASC LIMIT ? OFFSET ?");

        let mut query = sqlx::query_as::<_, LocationSummary>(&sql);
        if let Some(t) = location_type {
            query = query.bind(t);
        }
        let rows = query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Direct children of `parent_id`, ordered by `id`.
    pub async fn list_children(&self, parent_id: &str) -> AppResult<Vec<LocationSummary>> {
        let rows = sqlx::query_as::<_, LocationSummary>(&format!(
            "SELECT {} FROM locations WHERE parent_id = ?1 ORDER BY id ASC",
            SUMMARY_COLUMNS
        ))
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Every location with all fields, ordered by `id`.
    pub async fn all_locations(&self) -> AppResult<Vec<Location>> {
        let rows = sqlx::query_as::<_, LocationRow>(&format!(
            "SELECT {} FROM locations ORDER BY id ASC",
            LOCATION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Location::from).collect())
    }

    /// Every location ordered by title, ties broken by `id`.
    pub async fn locations_by_title(&self) -> AppResult<Vec<Location>> {
        let rows = sqlx::query_as::<_, LocationRow>(&format!(
            "SELECT {} FROM locations ORDER BY title ASC, id ASC",
            LOCATION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Location::from).collect())
    }

    /// Delete a location along with its descendants and their accommodations.
    pub async fn delete_location(&self, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM locations WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::test_support::create_test_db;
    use crate::error::AppError;
    use crate::models::LocationRecord;
    use crate::point::Point;

    fn record(id: &str, title: &str, location_type: &str) -> LocationRecord {
        LocationRecord {
            id: id.to_string(),
            title: title.to_string(),
            center: Point::new(10.0, 20.0),
            location_type: location_type.to_string(),
            country_code: "US".to_string(),
            state_abbr: "CA".to_string(),
            city: "San Francisco".to_string(),
        }
    }

    // ==================== upsert_location Tests ====================

    #[tokio::test]
    async fn test_upsert_location_inserts() {
        let (db, _temp_dir) = create_test_db().await;

        let created = db
            .upsert_location(&record("123", "Test Location", "city"))
            .await
            .expect("Should insert");
        assert!(created);

        let location = db.get_location("123").await.expect("get").expect("exists");
        assert_eq!(location.title, "Test Location");
        assert_eq!(location.center, Point::new(10.0, 20.0));
        assert!(location.parent_id.is_none());
        assert_eq!(location.created_at, location.updated_at);
    }

    #[tokio::test]
    async fn test_upsert_location_overwrites_without_duplicating() {
        let (db, _temp_dir) = create_test_db().await;

        db.upsert_location(&record("123", "Old Title", "city"))
            .await
            .expect("insert");
        let created = db
            .upsert_location(&record("123", "New Title", "region"))
            .await
            .expect("update");
        assert!(!created, "Second upsert should update");

        assert_eq!(db.count_locations(None).await.expect("count"), 1);
        let location = db.get_location("123").await.expect("get").expect("exists");
        assert_eq!(location.title, "New Title");
        assert_eq!(location.location_type, "region");
    }

    #[tokio::test]
    async fn test_upsert_location_preserves_parent_and_created_at() {
        let (db, _temp_dir) = create_test_db().await;

        db.upsert_location(&record("P", "Parent", "state")).await.expect("parent");
        db.upsert_location(&record("C", "Child", "city")).await.expect("child");
        db.set_location_parent("C", Some("P")).await.expect("link");
        let before = db.get_location("C").await.expect("get").expect("exists");

        db.upsert_location(&record("C", "Child Renamed", "city"))
            .await
            .expect("update");

        let after = db.get_location("C").await.expect("get").expect("exists");
        assert_eq!(after.parent_id.as_deref(), Some("P"));
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.title, "Child Renamed");
    }

    #[tokio::test]
    async fn test_upsert_location_rejects_long_fields() {
        let (db, _temp_dir) = create_test_db().await;

        let mut bad = record("123", "Title", "city");
        bad.state_abbr = "CALI".to_string();
        let err = db.upsert_location(&bad).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref v) if v.field == "state_abbr"));
        assert!(db.get_location("123").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_upsert_location_sql_injection_in_id() {
        let (db, _temp_dir) = create_test_db().await;

        db.upsert_location(&record("1'; DROP --", "Title", "city"))
            .await
            .expect("insert");
        assert_eq!(db.count_locations(None).await.expect("count"), 1);
    }

    // ==================== Parent / children Tests ====================

    #[tokio::test]
    async fn test_set_parent_requires_existing_parent() {
        let (db, _temp_dir) = create_test_db().await;

        db.upsert_location(&record("C", "Child", "city")).await.expect("child");
        let err = db.set_location_parent("C", Some("MISSING")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_set_parent_unknown_location() {
        let (db, _temp_dir) = create_test_db().await;

        let err = db.set_location_parent("NOPE", None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_set_parent_self_reference() {
        let (db, _temp_dir) = create_test_db().await;

        db.upsert_location(&record("A", "A", "city")).await.expect("insert");
        let err = db.set_location_parent("A", Some("A")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_children_direct_only() {
        let (db, _temp_dir) = create_test_db().await;

        for (id, title) in [("ROOT", "Root"), ("B", "Child B"), ("A", "Child A"), ("G", "Grandchild")] {
            db.upsert_location(&record(id, title, "city")).await.expect("insert");
        }
        db.set_location_parent("A", Some("ROOT")).await.expect("link");
        db.set_location_parent("B", Some("ROOT")).await.expect("link");
        db.set_location_parent("G", Some("A")).await.expect("link");

        let children = db.list_children("ROOT").await.expect("children");
        let ids: Vec<&str> = children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_delete_location_cascades_to_children() {
        let (db, _temp_dir) = create_test_db().await;

        db.upsert_location(&record("P", "Parent", "state")).await.expect("parent");
        db.upsert_location(&record("C", "Child", "city")).await.expect("child");
        db.upsert_location(&record("O", "Other", "city")).await.expect("other");
        db.set_location_parent("C", Some("P")).await.expect("link");

        assert!(db.delete_location("P").await.expect("delete"));
        assert!(db.get_location("C").await.expect("get").is_none());
        assert!(db.get_location("O").await.expect("get").is_some());
        assert!(!db.delete_location("P").await.expect("second delete"));
    }

    // ==================== Listing Tests ====================

    #[tokio::test]
    async fn test_list_locations_filter_and_order() {
        let (db, _temp_dir) = create_test_db().await;

        db.upsert_location(&record("3", "Three", "city")).await.expect("insert");
        db.upsert_location(&record("1", "One", "city")).await.expect("insert");
        db.upsert_location(&record("2", "Two", "region")).await.expect("insert");

        let all = db.list_locations(None, 10, 0).await.expect("list");
        let ids: Vec<&str> = all.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);

        let cities = db.list_locations(Some("city"), 10, 0).await.expect("list");
        assert_eq!(cities.len(), 2);
        assert_eq!(db.count_locations(Some("city")).await.expect("count"), 2);
        assert_eq!(db.count_locations(Some("country")).await.expect("count"), 0);
    }

    #[tokio::test]
    async fn test_list_locations_limit_offset() {
        let (db, _temp_dir) = create_test_db().await;

        for i in 0..15 {
            db.upsert_location(&record(&format!("L{:02}", i), "Title", "city"))
                .await
                .expect("insert");
        }

        let second_page = db.list_locations(None, 10, 10).await.expect("list");
        assert_eq!(second_page.len(), 5);
        assert_eq!(second_page[0].id, "L10");
    }

    #[tokio::test]
    async fn test_locations_by_title() {
        let (db, _temp_dir) = create_test_db().await;

        db.upsert_location(&record("1", "Zurich", "city")).await.expect("insert");
        db.upsert_location(&record("2", "Austin", "city")).await.expect("insert");

        let sorted = db.locations_by_title().await.expect("list");
        assert_eq!(sorted[0].title, "Austin");
        assert_eq!(sorted[1].title, "Zurich");
    }
}
