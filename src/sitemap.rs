//! `sitemap.json` generation.
//!
//! Locations are sorted by title and grouped by country code, with countries
//! kept in the order they first appear. Each location maps its title to
//! `<country code in lowercase>/<slug>`.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::db::Database;
use crate::models::Location;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SitemapCountry {
    pub country: String,
    pub name: String,
    pub locations: Vec<BTreeMap<String, String>>,
}

/// Lowercase the title and replace spaces with `-`.
pub fn slugify(title: &str) -> String {
    title.to_lowercase().replace(' ', "-")
}

/// Group `locations` (already sorted by title) into sitemap entries.
pub fn build_sitemap(locations: &[Location]) -> Vec<SitemapCountry> {
    let mut countries: Vec<SitemapCountry> = Vec::new();

    for location in locations {
        let url = format!(
            "{}/{}",
            location.country_code.to_lowercase(),
            slugify(&location.title)
        );
        let entry = BTreeMap::from([(location.title.clone(), url)]);

        match countries
            .iter_mut()
            .find(|c| c.country == location.country_code)
        {
            Some(country) => country.locations.push(entry),
            None => countries.push(SitemapCountry {
                country: location.country_code.clone(),
                name: location.country_code.clone(),
                locations: vec![entry],
            }),
        }
    }

    countries
}

/// Serialize with four-space indentation.
pub fn render_sitemap(sitemap: &[SitemapCountry]) -> serde_json::Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    sitemap.serialize(&mut serializer)?;
    Ok(out)
}

/// Build the sitemap from every stored location and write it to `path`.
///
/// Returns the number of locations written.
pub async fn write_sitemap(db: &Database, path: &Path) -> Result<usize> {
    let locations = db
        .locations_by_title()
        .await
        .context("Failed to load locations")?;
    let sitemap = build_sitemap(&locations);
    let bytes = render_sitemap(&sitemap).context("Failed to serialize sitemap")?;

    tokio::fs::write(path, bytes)
        .await
        .context(format!("Error writing {}", path.display()))?;

    info!(
        "Wrote {} locations in {} countries to {}",
        locations.len(),
        sitemap.len(),
        path.display()
    );
    Ok(locations.len())
}
