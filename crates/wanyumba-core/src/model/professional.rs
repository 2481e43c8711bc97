// ── Professional profile domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

/// A professional-profile submission awaiting review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Professional {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    /// Declared trade, e.g. `"agent"`, `"surveyor"`, `"conveyancer"`.
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub review_status: ReviewStatus,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Review state of a professional profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    #[serde(other)]
    Unknown,
}

/// Reviewer verdict sent back to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReviewDecision {
    Approve,
    Reject,
}
