//! Prediction service: Orchestrates a severity assessment.
//!
//! This service coordinates:
//! - Request normalization
//! - The severity decision
//! - Recommendation lookup
//! - Best-effort persistence of the prediction record

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::decision::{Decision, SeverityEngine};
use crate::domain::{recommend, PredictionRecord, Recommendation, Resource, Severity, SymptomReport};
use crate::ports::{Clock, Storage, SystemClock};

/// Text returned when the classifier was needed but is not loaded.
pub const MODEL_UNAVAILABLE_TEXT: &str = "Could not load prediction model. Please contact support.";

/// Client-facing result of a prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictResponse {
    pub severity: Severity,
    pub recommendation: String,
    pub resources: Vec<Resource>,
    /// Set when the classifier was unavailable
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub degraded: bool,
}

impl PredictResponse {
    fn from_recommendation(severity: Severity, recommendation: Recommendation) -> Self {
        Self {
            severity,
            recommendation: recommendation.text,
            resources: recommendation.resources,
            degraded: false,
        }
    }

    fn model_unavailable() -> Self {
        Self {
            severity: Severity::Controlled,
            recommendation: MODEL_UNAVAILABLE_TEXT.to_string(),
            resources: Vec::new(),
            degraded: true,
        }
    }
}

/// Response plus what happened on the way.
#[derive(Debug, Clone)]
pub struct PredictionOutcome {
    pub response: PredictResponse,
    pub decision: Decision,
    /// Row id when the record was stored
    pub record_id: Option<i64>,
}

impl PredictionOutcome {
    /// Whether the record reached the store.
    #[must_use]
    pub fn persisted(&self) -> bool {
        self.record_id.is_some()
    }
}

/// Service for running severity assessments.
pub struct PredictionService<S>
where
    S: Storage,
{
    engine: SeverityEngine,
    storage: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> PredictionService<S>
where
    S: Storage,
    S::Error: Into<crate::adapters::StorageError>,
{
    /// Create a new prediction service using the wall clock.
    pub fn new(engine: SeverityEngine, storage: Arc<S>) -> Self {
        Self::with_clock(engine, storage, Arc::new(SystemClock))
    }

    /// Create a new prediction service with an injected clock.
    pub fn with_clock(engine: SeverityEngine, storage: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            engine,
            storage,
            clock,
        }
    }

    /// Whether a classifier is loaded.
    #[must_use]
    pub fn classifier_loaded(&self) -> bool {
        self.engine.has_classifier()
    }

    /// Assess a raw request body. Never fails; see [`Self::predict`].
    pub fn predict_json(&self, body: &Value, owner: Option<&str>) -> PredictionOutcome {
        self.predict(&SymptomReport::from_json(body), owner)
    }

    /// Run an assessment.
    ///
    /// Performs the full pipeline:
    /// 1. Decide the severity
    /// 2. Look up the recommendation
    /// 3. Save the record to storage (best effort)
    ///
    /// A degraded decision returns the support message and stores nothing.
    /// A storage failure is logged and reported through
    /// [`PredictionOutcome::persisted`]; the response is still returned.
    pub fn predict(&self, report: &SymptomReport, owner: Option<&str>) -> PredictionOutcome {
        tracing::info!("Starting severity assessment...");

        // Step 1: Decide
        tracing::debug!(
            "Step 1: Deciding severity ({} of 6 symptoms, age {})",
            report.symptoms.count(),
            report.demographics.age
        );
        let decision = self.engine.decide(&report.symptoms, &report.demographics);

        if decision.is_degraded() {
            tracing::warn!("Classifier unavailable; returning support message without saving");
            return PredictionOutcome {
                response: PredictResponse::model_unavailable(),
                decision,
                record_id: None,
            };
        }

        // Step 2: Recommendation
        tracing::debug!("Step 2: Looking up recommendation for {}", decision.severity);
        let recommendation = recommend(decision.severity);

        // Step 3: Save
        tracing::debug!("Step 3: Saving prediction record...");
        let record = PredictionRecord::build(
            owner,
            report.symptoms,
            &report.demographics,
            decision.severity,
            &recommendation,
            self.clock.now(),
        );
        let record_id = match self.storage.insert_prediction(&record) {
            Ok(id) => Some(id),
            Err(e) => {
                let e: crate::adapters::StorageError = e.into();
                tracing::warn!("Failed to save prediction: {}", e);
                None
            }
        };

        tracing::info!(
            "Assessment complete: severity={}, saved={}",
            decision.severity,
            record_id.is_some()
        );

        PredictionOutcome {
            response: PredictResponse::from_recommendation(decision.severity, recommendation),
            decision,
            record_id,
        }
    }
}
