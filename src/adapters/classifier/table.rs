//! Bulk-table classifier.
//!
//! A table artifact carries no prediction capability of its own. Severity is
//! derived from the symptom count, escalated one grade for patients aged 60
//! or over. A table of text entries cannot be interpreted at all and always
//! answers `Controlled`.

use crate::domain::{FeatureVector, Severity};
use crate::ports::Classifier;

/// How the first table entry was typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Numeric,
    /// Degraded: every prediction is `Controlled`
    Textual,
}

/// Classifier over a bulk numeric or textual table.
#[derive(Debug, Clone)]
pub struct TableClassifier {
    kind: TableKind,
}

impl TableClassifier {
    #[must_use]
    pub fn new(kind: TableKind) -> Self {
        if kind == TableKind::Textual {
            tracing::warn!("Classifier table holds text entries; every prediction will be CONTROLLED");
        }
        Self { kind }
    }

    fn score(row: &FeatureVector) -> Severity {
        let count = row.symptom_values().iter().filter(|&&v| v != 0.0).count();
        let base = match count {
            4.. => Severity::Severe,
            2..=3 => Severity::Moderate,
            1 => Severity::Mild,
            0 => Severity::Controlled,
        };
        if row.is_senior() {
            base.escalate()
        } else {
            base
        }
    }
}

impl Classifier for TableClassifier {
    fn name(&self) -> &'static str {
        match self.kind {
            TableKind::Numeric => "table",
            TableKind::Textual => "table (textual)",
        }
    }

    fn predict_batch(&self, rows: &[FeatureVector]) -> Vec<Severity> {
        match self.kind {
            TableKind::Textual => vec![Severity::Controlled; rows.len()],
            TableKind::Numeric => rows
                .iter()
                .map(|row| {
                    let severity = Self::score(row);
                    tracing::debug!("Table classifier scored row: severity={}", severity);
                    severity
                })
                .collect(),
        }
    }
}
