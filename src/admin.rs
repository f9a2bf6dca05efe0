//! Admin operations, with ownership rules applied.
//!
//! Every function takes the authenticated [`Principal`]. Listings are narrowed
//! with [`OwnerScope`]; single-object actions load the object first so that an
//! unknown id is a 404 and someone else's object is a 403.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::access::{ensure_owner, resolve_owner, OwnerScope, Principal};
use crate::db::{AccommodationFilter, Database};
use crate::error::{AppError, AppResult, ValidationError};
use crate::i18n::LocalizationValidator;
use crate::import::{import_locations, ImportReport};
use crate::models::{
    Accommodation, AccommodationRecord, FlashMessage, LocalizationInput, LocalizedAccommodation,
    Location, LocationRecord,
};
use crate::point::Point;

// ==================== Accommodations ====================

/// An accommodation as shown on the admin edit form.
///
/// `user_id` is only present for superusers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccommodationForm {
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Option<i64>>,
    pub published: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl AccommodationForm {
    pub fn for_principal(principal: &Principal, accommodation: Accommodation) -> Self {
        let user_id = principal.is_superuser.then_some(accommodation.user_id);
        Self {
            id: accommodation.id,
            feed: accommodation.feed,
            title: accommodation.title,
            country_code: accommodation.country_code,
            bedroom_count: accommodation.bedroom_count,
            review_score: accommodation.review_score,
            usd_rate: accommodation.usd_rate,
            center: accommodation.center,
            images: accommodation.images,
            location_id: accommodation.location_id,
            amenities: accommodation.amenities,
            user_id,
            published: accommodation.published,
            created_at: accommodation.created_at,
            updated_at: accommodation.updated_at,
        }
    }
}

/// Outcome of saving an accommodation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedAccommodation {
    pub created: bool,
    pub accommodation: AccommodationForm,
}

pub async fn list_accommodations(
    db: &Database,
    principal: &Principal,
    filter: &AccommodationFilter,
) -> AppResult<Vec<Accommodation>> {
    db.list_accommodations(filter, OwnerScope::for_principal(principal), -1, 0)
        .await
}

async fn load_owned_accommodation(
    db: &Database,
    principal: &Principal,
    id: &str,
) -> AppResult<Accommodation> {
    let accommodation = db
        .get_accommodation(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Accommodation {}", id)))?;
    ensure_owner(principal, accommodation.user_id, "accommodations")?;
    Ok(accommodation)
}

pub async fn get_accommodation(
    db: &Database,
    principal: &Principal,
    id: &str,
) -> AppResult<AccommodationForm> {
    let accommodation = load_owned_accommodation(db, principal, id).await?;
    Ok(AccommodationForm::for_principal(principal, accommodation))
}

/// Create or update the accommodation at `id`.
///
/// The path id wins over any id in the body. The owner is decided by
/// [`resolve_owner`], so a non-superuser can neither claim nor reassign rows.
pub async fn save_accommodation(
    db: &Database,
    principal: &Principal,
    id: &str,
    mut record: AccommodationRecord,
) -> AppResult<SavedAccommodation> {
    record.id = id.to_string();

    let existing = db.get_accommodation(id).await?;
    let stored_owner = match &existing {
        Some(accommodation) => {
            ensure_owner(principal, accommodation.user_id, "accommodations")?;
            accommodation.user_id
        }
        None => None,
    };

    record.user_id = resolve_owner(principal, existing.is_none(), stored_owner, record.user_id);

    let created = db.upsert_accommodation(&record).await?;
    info!(
        "{} {} accommodation {}",
        principal.username,
        if created { "created" } else { "updated" },
        id
    );

    let saved = db
        .get_accommodation(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Accommodation {}", id)))?;

    Ok(SavedAccommodation {
        created,
        accommodation: AccommodationForm::for_principal(principal, saved),
    })
}

pub async fn delete_accommodation(db: &Database, principal: &Principal, id: &str) -> AppResult<()> {
    load_owned_accommodation(db, principal, id).await?;
    db.delete_accommodation(id).await?;
    info!("{} deleted accommodation {}", principal.username, id);
    Ok(())
}

// ==================== Localizations ====================

/// A row of the admin localization listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalizationListItem {
    pub id: i64,
    pub accommodation_id: String,
    pub language: String,
    pub description_short: String,
}

impl From<LocalizedAccommodation> for LocalizationListItem {
    fn from(localization: LocalizedAccommodation) -> Self {
        Self {
            description_short: localization.description_short(),
            id: localization.id,
            accommodation_id: localization.accommodation_id,
            language: localization.language,
        }
    }
}

pub async fn list_localizations(
    db: &Database,
    principal: &Principal,
    language: Option<&str>,
) -> AppResult<Vec<LocalizationListItem>> {
    let localizations = db
        .list_localizations(OwnerScope::for_principal(principal), language)
        .await?;
    Ok(localizations
        .into_iter()
        .map(LocalizationListItem::from)
        .collect())
}

async fn load_owned_localization(
    db: &Database,
    principal: &Principal,
    id: i64,
) -> AppResult<LocalizedAccommodation> {
    let (localization, owner) = db
        .get_localization(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Localization {}", id)))?;
    ensure_owner(principal, owner, "localizations for accommodations")?;
    Ok(localization)
}

pub async fn get_localization(
    db: &Database,
    principal: &Principal,
    id: i64,
) -> AppResult<LocalizedAccommodation> {
    load_owned_localization(db, principal, id).await
}

/// Validate and store a localization for an accommodation the principal owns.
///
/// Language validation runs before the ownership check.
pub async fn save_localization(
    db: &Database,
    validator: &LocalizationValidator,
    principal: &Principal,
    input: LocalizationInput,
) -> AppResult<LocalizedAccommodation> {
    let validated = validator.validate(input).await?;

    let accommodation = db
        .get_accommodation(validated.accommodation_id())
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Accommodation {}", validated.accommodation_id()))
        })?;
    ensure_owner(
        principal,
        accommodation.user_id,
        "localizations for accommodations",
    )?;

    let saved = db.save_localization(&validated).await?;
    info!(
        "{} saved '{}' localization for accommodation {}",
        principal.username, saved.language, saved.accommodation_id
    );
    Ok(saved)
}

pub async fn delete_localization(db: &Database, principal: &Principal, id: i64) -> AppResult<()> {
    load_owned_localization(db, principal, id).await?;
    db.delete_localization(id).await?;
    info!("{} deleted localization {}", principal.username, id);
    Ok(())
}

// ==================== Locations ====================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationOverview {
    pub locations: Vec<Location>,
    pub messages: Vec<FlashMessage>,
}

/// Every location, plus the principal's pending messages (which are consumed).
pub async fn location_overview(db: &Database, principal: &Principal) -> AppResult<LocationOverview> {
    let locations = db.all_locations().await?;
    let messages = db.take_messages(principal.user_id).await?;
    Ok(LocationOverview {
        locations,
        messages,
    })
}

/// The admin edit form for a location, keyed by the id in the path.
///
/// A missing `parent_id` detaches the location from its parent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocationForm {
    pub title: String,
    pub center: Point,
    pub location_type: String,
    pub country_code: String,
    #[serde(default)]
    pub state_abbr: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedLocation {
    pub created: bool,
    pub location: Location,
}

pub async fn get_location(db: &Database, id: &str) -> AppResult<Location> {
    db.get_location(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Location '{}'", id)))
}

/// Walk up from `parent_id` and reject parents that are missing or would nest
/// `id` under itself.
async fn check_parent(db: &Database, id: &str, parent_id: &str) -> AppResult<()> {
    let mut current = db.get_location(parent_id).await?.ok_or_else(|| {
        ValidationError::new(
            "parent_id",
            format!("Location '{}' does not exist.", parent_id),
        )
    })?;

    loop {
        if current.id == id {
            return Err(ValidationError::new(
                "parent_id",
                "A location cannot be nested under itself.",
            )
            .into());
        }
        let Some(next) = current.parent_id else {
            return Ok(());
        };
        match db.get_location(&next).await? {
            Some(location) => current = location,
            None => return Ok(()),
        }
    }
}

/// Create or update the location at `id`, including its parent link.
pub async fn save_location(
    db: &Database,
    principal: &Principal,
    id: &str,
    form: LocationForm,
) -> AppResult<SavedLocation> {
    if let Some(parent_id) = form.parent_id.as_deref() {
        check_parent(db, id, parent_id).await?;
    }

    let record = LocationRecord {
        id: id.to_string(),
        title: form.title,
        center: form.center,
        location_type: form.location_type,
        country_code: form.country_code,
        state_abbr: form.state_abbr,
        city: form.city,
    };
    let created = db.upsert_location(&record).await?;
    db.set_location_parent(id, form.parent_id.as_deref()).await?;

    info!(
        "{} {} location {}",
        principal.username,
        if created { "created" } else { "updated" },
        id
    );

    Ok(SavedLocation {
        created,
        location: get_location(db, id).await?,
    })
}

/// Delete a location. Its descendants and their accommodations go with it.
pub async fn delete_location(db: &Database, principal: &Principal, id: &str) -> AppResult<()> {
    if !db.delete_location(id).await? {
        return Err(AppError::NotFound(format!("Location '{}'", id)));
    }
    info!("{} deleted location {}", principal.username, id);
    Ok(())
}

/// Import a CSV upload and queue its outcome as messages for the principal.
pub async fn import_locations_csv(
    db: &Database,
    principal: &Principal,
    bytes: &[u8],
) -> AppResult<ImportReport> {
    let report = import_locations(db, bytes).await?;

    for error in &report.errors {
        db.push_message(principal.user_id, "error", error).await?;
    }
    db.push_message(principal.user_id, "success", &report.summary())
        .await?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::create_test_db;
    use crate::i18n::{Detection, DetectionError, LanguageDetector};
    use crate::models::{LocationRecord, PROPERTY_OWNERS_GROUP};
    use async_trait::async_trait;
    use serde_json::json;
    use std::str::FromStr;
    use std::sync::Arc;

    struct AlwaysEnglish;

    #[async_trait]
    impl LanguageDetector for AlwaysEnglish {
        async fn detect(&self, _text: &str) -> Result<Detection, DetectionError> {
            Ok(Detection {
                language: "en".to_string(),
                confidence: 99.0,
            })
        }
    }

    struct Fixture {
        db: Database,
        _temp_dir: tempfile::TempDir,
        alice: Principal,
        bob: Principal,
        root: Principal,
    }

    async fn principal(db: &Database, username: &str, superuser: bool) -> Principal {
        let user = if superuser {
            db.create_superuser(username, "x@example.com", "pw").await
        } else {
            db.create_user(username, "x@example.com", "pw").await
        }
        .expect("user");
        if !superuser {
            let group = db.get_or_create_group(PROPERTY_OWNERS_GROUP).await.expect("group");
            db.add_user_to_group(user.id, group).await.expect("membership");
        }
        db.authenticate(username, "pw").await.expect("q").expect("auth")
    }

    async fn fixture() -> Fixture {
        let (db, temp_dir) = create_test_db().await;
        db.upsert_location(&LocationRecord {
            id: "L1".to_string(),
            title: "Lisbon".to_string(),
            center: Point::new(-9.14, 38.72),
            location_type: "city".to_string(),
            country_code: "PT".to_string(),
            state_abbr: "LIS".to_string(),
            city: "Lisbon".to_string(),
        })
        .await
        .expect("location");

        let alice = principal(&db, "alice", false).await;
        let bob = principal(&db, "bob", false).await;
        let root = principal(&db, "root", true).await;

        Fixture {
            db,
            _temp_dir: temp_dir,
            alice,
            bob,
            root,
        }
    }

    fn record(id: &str, user_id: Option<i64>) -> AccommodationRecord {
        AccommodationRecord {
            id: id.to_string(),
            feed: 0,
            title: format!("Flat {}", id),
            country_code: "PT".to_string(),
            bedroom_count: 1,
            review_score: BigDecimal::from_str("4.0").expect("decimal"),
            usd_rate: BigDecimal::from_str("99.5").expect("decimal"),
            center: Point::new(-9.1, 38.7),
            images: json!({}),
            location_id: "L1".to_string(),
            amenities: json!({"wifi": true}),
            user_id,
            published: true,
        }
    }

    fn validator() -> LocalizationValidator {
        LocalizationValidator::new(Arc::new(AlwaysEnglish))
    }

    // ==================== Accommodation Tests ====================

    #[tokio::test]
    async fn test_new_accommodation_is_owned_by_creator() {
        let f = fixture().await;

        // Alice tries to hand the record to Bob; the value is ignored.
        let saved = save_accommodation(&f.db, &f.alice, "A1", record("A1", Some(f.bob.user_id)))
            .await
            .expect("save");
        assert!(saved.created);
        assert!(saved.accommodation.user_id.is_none(), "hidden from non-superusers");

        let stored = f.db.get_accommodation("A1").await.expect("get").expect("exists");
        assert_eq!(stored.user_id, Some(f.alice.user_id));
    }

    #[tokio::test]
    async fn test_superuser_can_reassign_owner() {
        let f = fixture().await;

        // Creation always assigns the creator.
        let saved = save_accommodation(&f.db, &f.root, "A1", record("A1", Some(f.bob.user_id)))
            .await
            .expect("create");
        assert_eq!(saved.accommodation.user_id, Some(Some(f.root.user_id)));

        let saved = save_accommodation(&f.db, &f.root, "A1", record("A1", Some(f.bob.user_id)))
            .await
            .expect("reassign");
        assert_eq!(saved.accommodation.user_id, Some(Some(f.bob.user_id)));
    }

    #[tokio::test]
    async fn test_non_owner_cannot_get_edit_or_delete() {
        let f = fixture().await;
        save_accommodation(&f.db, &f.alice, "A1", record("A1", None))
            .await
            .expect("save");

        let err = get_accommodation(&f.db, &f.bob, "A1").await.unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));

        let err = save_accommodation(&f.db, &f.bob, "A1", record("A1", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));

        let err = delete_accommodation(&f.db, &f.bob, "A1").await.unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));
        assert!(f.db.get_accommodation("A1").await.expect("get").is_some());
    }

    #[tokio::test]
    async fn test_superuser_can_manage_any_accommodation() {
        let f = fixture().await;
        save_accommodation(&f.db, &f.alice, "A1", record("A1", None))
            .await
            .expect("save");

        let form = get_accommodation(&f.db, &f.root, "A1").await.expect("get");
        assert_eq!(form.user_id, Some(Some(f.alice.user_id)));

        delete_accommodation(&f.db, &f.root, "A1").await.expect("delete");
        assert!(f.db.get_accommodation("A1").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_unknown_accommodation_is_not_found() {
        let f = fixture().await;

        let err = get_accommodation(&f.db, &f.alice, "NOPE").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = delete_accommodation(&f.db, &f.root, "NOPE").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_owner_edit_keeps_owner() {
        let f = fixture().await;
        save_accommodation(&f.db, &f.alice, "A1", record("A1", None))
            .await
            .expect("create");

        let mut changed = record("A1", Some(f.bob.user_id));
        changed.title = "Renamed".to_string();
        let saved = save_accommodation(&f.db, &f.alice, "A1", changed)
            .await
            .expect("update");
        assert!(!saved.created);
        assert_eq!(saved.accommodation.title, "Renamed");

        let stored = f.db.get_accommodation("A1").await.expect("get").expect("exists");
        assert_eq!(stored.user_id, Some(f.alice.user_id));
    }

    #[tokio::test]
    async fn test_list_accommodations_is_scoped() {
        let f = fixture().await;
        save_accommodation(&f.db, &f.alice, "A1", record("A1", None)).await.expect("A1");
        save_accommodation(&f.db, &f.bob, "B1", record("B1", None)).await.expect("B1");

        let filter = AccommodationFilter::default();
        let alices = list_accommodations(&f.db, &f.alice, &filter).await.expect("list");
        assert_eq!(alices.len(), 1);
        assert_eq!(alices[0].id, "A1");

        let all = list_accommodations(&f.db, &f.root, &filter).await.expect("list");
        assert_eq!(all.len(), 2);
    }

    // ==================== Localization Tests ====================

    fn localization_input(accommodation_id: &str) -> LocalizationInput {
        LocalizationInput {
            accommodation_id: accommodation_id.to_string(),
            language: "en".to_string(),
            description: "A bright flat in the old town".to_string(),
            policy: json!({"pet_policy": "No pets"}),
        }
    }

    #[tokio::test]
    async fn test_owner_can_save_localization() {
        let f = fixture().await;
        save_accommodation(&f.db, &f.alice, "A1", record("A1", None)).await.expect("A1");

        let saved = save_localization(&f.db, &validator(), &f.alice, localization_input("A1"))
            .await
            .expect("save");
        assert_eq!(saved.language, "en");

        let listed = list_localizations(&f.db, &f.alice, None).await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].description_short, "A bright flat in the old town");
    }

    #[tokio::test]
    async fn test_non_owner_cannot_localize() {
        let f = fixture().await;
        save_accommodation(&f.db, &f.alice, "A1", record("A1", None)).await.expect("A1");

        let err = save_localization(&f.db, &validator(), &f.bob, localization_input("A1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));
        assert!(list_localizations(&f.db, &f.root, None)
            .await
            .expect("list")
            .is_empty());
    }

    #[tokio::test]
    async fn test_validation_runs_before_ownership() {
        let f = fixture().await;
        save_accommodation(&f.db, &f.alice, "A1", record("A1", None)).await.expect("A1");

        let mut input = localization_input("A1");
        input.policy = json!("not an object");
        let err = save_localization(&f.db, &validator(), &f.bob, input)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_localization_get_and_delete_are_owner_only() {
        let f = fixture().await;
        save_accommodation(&f.db, &f.alice, "A1", record("A1", None)).await.expect("A1");
        let saved = save_localization(&f.db, &validator(), &f.alice, localization_input("A1"))
            .await
            .expect("save");

        let err = get_localization(&f.db, &f.bob, saved.id).await.unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));
        let err = delete_localization(&f.db, &f.bob, saved.id).await.unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));

        assert_eq!(
            get_localization(&f.db, &f.alice, saved.id).await.expect("get"),
            saved
        );
        delete_localization(&f.db, &f.alice, saved.id).await.expect("delete");

        let err = get_localization(&f.db, &f.alice, saved.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_localization_for_unknown_accommodation() {
        let f = fixture().await;

        let err = save_localization(&f.db, &validator(), &f.root, localization_input("NOPE"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    // ==================== Location Tests ====================

    fn location_form(title: &str, parent_id: Option<&str>) -> LocationForm {
        LocationForm {
            title: title.to_string(),
            center: Point::new(-8.61, 41.15),
            location_type: "city".to_string(),
            country_code: "PT".to_string(),
            state_abbr: "POR".to_string(),
            city: title.to_string(),
            parent_id: parent_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_save_location_sets_parent() {
        let f = fixture().await;

        let saved = save_location(&f.db, &f.alice, "L2", location_form("Porto", Some("L1")))
            .await
            .expect("save");
        assert!(saved.created);
        assert_eq!(saved.location.parent_id.as_deref(), Some("L1"));

        let children = f.db.list_children("L1").await.expect("children");
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, "L2");

        let updated = save_location(&f.db, &f.alice, "L2", location_form("Porto", None))
            .await
            .expect("detach");
        assert!(!updated.created);
        assert!(updated.location.parent_id.is_none());
    }

    #[tokio::test]
    async fn test_save_location_rejects_missing_parent() {
        let f = fixture().await;

        let err = save_location(&f.db, &f.alice, "L2", location_form("Porto", Some("NOPE")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref v) if v.field == "parent_id"));
        assert!(f.db.get_location("L2").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_save_location_rejects_cycles() {
        let f = fixture().await;

        save_location(&f.db, &f.alice, "L2", location_form("Porto", Some("L1")))
            .await
            .expect("child");

        let err = save_location(&f.db, &f.alice, "L1", location_form("Lisbon", Some("L2")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = save_location(&f.db, &f.alice, "L1", location_form("Lisbon", Some("L1")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_location_cascades() {
        let f = fixture().await;

        save_location(&f.db, &f.alice, "L2", location_form("Porto", Some("L1")))
            .await
            .expect("child");
        save_accommodation(&f.db, &f.alice, "A1", record("A1", None))
            .await
            .expect("accommodation");

        delete_location(&f.db, &f.alice, "L1").await.expect("delete");
        assert!(f.db.get_location("L2").await.expect("get").is_none());
        assert!(f.db.get_accommodation("A1").await.expect("get").is_none());

        let err = delete_location(&f.db, &f.alice, "L1").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_import_queues_messages_until_overview() {
        let f = fixture().await;

        let csv = "id,title,center,location_type,country_code,state_abbr,city\n\
                   L2,Porto,POINT(-8.61 41.15),city,PT,POR,Porto\n\
                   L3,Broken,POINT(oops 41.15),city,PT,POR,Porto\n";
        let report = import_locations_csv(&f.db, &f.alice, csv.as_bytes())
            .await
            .expect("import");
        assert_eq!(report.imported, 1);

        let overview = location_overview(&f.db, &f.alice).await.expect("overview");
        assert_eq!(overview.locations.len(), 2);
        assert_eq!(overview.messages.len(), 2);
        assert_eq!(overview.messages[0].level, "error");
        assert!(overview.messages[0].message.starts_with("Error on row 2:"));
        assert_eq!(
            overview.messages[1].message,
            "CSV import complete. 1 rows imported, 1 rows skipped."
        );

        let again = location_overview(&f.db, &f.alice).await.expect("overview");
        assert!(again.messages.is_empty());
    }
}
