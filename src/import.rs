//! Bulk import of locations from an uploaded CSV file.
//!
//! Rows are processed independently: a bad row is counted and described, the
//! rest of the file still goes through. Rows written before a later failure
//! stay written.

use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::LocationRecord;
use crate::point::parse_point;

const COLUMNS: [&str; 7] = [
    "id",
    "title",
    "center",
    "location_type",
    "country_code",
    "state_abbr",
    "city",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub total: usize,
    pub imported: usize,
    pub skipped: usize,
    /// One `"Error on row <n>: <error>"` line per skipped row.
    pub errors: Vec<String>,
}

impl ImportReport {
    pub fn summary(&self) -> String {
        format!(
            "CSV import complete. {} rows imported, {} rows skipped.",
            self.imported, self.skipped
        )
    }
}

/// Header name to column index.
struct HeaderIndex(HashMap<String, usize>);

impl HeaderIndex {
    fn new(headers: &StringRecord) -> Self {
        Self(
            headers
                .iter()
                .enumerate()
                .map(|(i, name)| (name.trim().to_string(), i))
                .collect(),
        )
    }

    fn field<'r>(&self, row: &'r StringRecord, name: &str) -> AppResult<&'r str> {
        self.0
            .get(name)
            .and_then(|&i| row.get(i))
            .ok_or_else(|| AppError::MissingField(name.to_string()))
    }
}

fn location_from_row(headers: &HeaderIndex, row: &StringRecord) -> AppResult<LocationRecord> {
    // Look every column up first so a short row reports the first gap.
    for column in COLUMNS {
        headers.field(row, column)?;
    }

    Ok(LocationRecord {
        id: headers.field(row, "id")?.to_string(),
        title: headers.field(row, "title")?.to_string(),
        center: parse_point(headers.field(row, "center")?)?,
        location_type: headers.field(row, "location_type")?.to_string(),
        country_code: headers.field(row, "country_code")?.to_string(),
        state_abbr: headers.field(row, "state_abbr")?.to_string(),
        city: headers.field(row, "city")?.to_string(),
    })
}

/// Import every row of `bytes` as a location keyed by `id`.
///
/// Fails as a whole only when the file is not UTF-8 or has no readable header.
pub async fn import_locations(db: &Database, bytes: &[u8]) -> AppResult<ImportReport> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| AppError::BadRequest("CSV file must be UTF-8 encoded".to_string()))?;

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = HeaderIndex::new(
        reader
            .headers()
            .map_err(|e| AppError::BadRequest(format!("Unreadable CSV header: {}", e)))?,
    );

    let mut report = ImportReport::default();

    for result in reader.records() {
        report.total += 1;
        let row_number = report.total;

        let outcome = match result {
            Ok(row) => match location_from_row(&headers, &row) {
                Ok(record) => db.upsert_location(&record).await.map(|_| ()),
                Err(e) => Err(e),
            },
            Err(e) => Err(AppError::BadRequest(e.to_string())),
        };

        if let Err(e) = outcome {
            warn!("Skipping CSV row {}: {}", row_number, e);
            report.skipped += 1;
            report.errors.push(format!("Error on row {}: {}", row_number, e));
        }
    }

    report.imported = report.total - report.skipped;
    info!("{}", report.summary());

    Ok(report)
}
