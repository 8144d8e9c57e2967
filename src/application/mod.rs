//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the core use cases of the application.

mod accounts;
mod decision;
mod prediction;

pub use accounts::{AccountService, CleanupReport, SessionStatus};
pub use decision::{Decision, DecisionSource, OverrideRule, SeverityEngine, OVERRIDE_RULES};
pub use prediction::{PredictResponse, PredictionOutcome, PredictionService, MODEL_UNAVAILABLE_TEXT};
