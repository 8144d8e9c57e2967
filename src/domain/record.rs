//! Persisted prediction records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::recommendation::{Recommendation, Resource};
use super::severity::Severity;
use super::symptoms::{Demographics, SymptomVector};

/// One completed assessment, as handed to storage.
///
/// Immutable once built. `id` is assigned by the store on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Storage row id (absent until persisted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Authenticated user, if any
    #[serde(rename = "username")]
    pub owner: Option<String>,

    pub symptoms: SymptomVector,

    pub age: u32,

    /// Gender exactly as submitted
    pub gender: String,

    pub severity: Severity,

    pub recommendation_text: String,

    pub recommendation_resources: Vec<Resource>,

    /// When the assessment was made
    pub timestamp: DateTime<Utc>,
}

impl PredictionRecord {
    /// Assemble a record. `now` comes from the caller's clock.
    #[must_use]
    pub fn build(
        owner: Option<&str>,
        symptoms: SymptomVector,
        demographics: &Demographics,
        severity: Severity,
        recommendation: &Recommendation,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            owner: owner.map(str::to_string),
            symptoms,
            age: demographics.age,
            gender: demographics.gender.clone(),
            severity,
            recommendation_text: recommendation.text.clone(),
            recommendation_resources: recommendation.resources.clone(),
            timestamp: now,
        }
    }
}
