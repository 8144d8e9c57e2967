//! Domain layer: Core assessment types and pure logic.
//!
//! Everything here is deterministic and free of I/O.

pub mod credentials;
mod features;
mod recommendation;
mod record;
mod severity;
mod symptoms;

pub use credentials::{CredentialError, Password, UserAccount};
pub use features::{AgeBucket, FeatureVector, FEATURE_COUNT, SENIOR_INDEX};
pub use recommendation::{recommend, recommend_level, Recommendation, Resource};
pub use record::PredictionRecord;
pub use severity::Severity;
pub use symptoms::{
    normalize_age, truthy, Demographics, Gender, SymptomReport, SymptomVector, SYMPTOM_COUNT,
    SYMPTOM_NAMES,
};
