// ── Scraped listing domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

/// A listing collected by the scraper fleet, pending triage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(alias = "_id")]
    pub id: String,
    /// Site key the listing was scraped from (e.g. `"zillow"`).
    pub source_site: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub status: ListingStatus,
    #[serde(default)]
    pub scraped_at: Option<DateTime<Utc>>,
}

/// Triage state of a scraped listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    New,
    Imported,
    Discarded,
    #[serde(other)]
    Unknown,
}
