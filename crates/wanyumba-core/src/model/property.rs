// ── Property domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

/// A property managed on the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bedrooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<u32>,
    /// Gallery image URLs in display order.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub status: PropertyStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Publication state of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PropertyStatus {
    Draft,
    Published,
    Archived,
    /// The server grew a state this build doesn't know about.
    #[default]
    #[serde(other)]
    Unknown,
}
