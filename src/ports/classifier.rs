//! Classifier port: Trait for the trained severity artifact.
//!
//! The decision engine only sees this trait. Which concrete variant backs
//! it is decided once, when the artifact is loaded.

use crate::domain::{FeatureVector, Severity};

/// A loaded severity classifier.
///
/// Implementations are immutable after loading and are shared read-only
/// across concurrent requests.
pub trait Classifier: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &'static str;

    /// Predict one severity per input row, in input order.
    fn predict_batch(&self, rows: &[FeatureVector]) -> Vec<Severity>;

    /// Predict a single row.
    fn predict(&self, row: &FeatureVector) -> Severity {
        self.predict_batch(std::slice::from_ref(row))
            .first()
            .copied()
            .unwrap_or(Severity::Controlled)
    }
}
