//! Native classifier: an exported linear model with its own prediction.
//!
//! Each class has one weight per feature plus an intercept. The predicted
//! class is the arg-max score; its label is cast to a severity grade.

use serde::{Deserialize, Serialize};

use super::ClassifierError;
use crate::domain::{FeatureVector, Severity, FEATURE_COUNT};
use crate::ports::Classifier;

/// Linear model parameters as exported by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    /// One row of `FEATURE_COUNT` weights per class
    pub weights: Vec<Vec<f64>>,
    /// One intercept per class
    pub intercepts: Vec<f64>,
    /// Output label per class; defaults to the class index
    #[serde(default)]
    pub classes: Option<Vec<i64>>,
}

/// Classifier backed by a [`LinearModel`].
#[derive(Debug, Clone)]
pub struct NativeClassifier {
    model: LinearModel,
    labels: Vec<i64>,
}

impl NativeClassifier {
    /// Validate parameters and build the classifier.
    ///
    /// # Errors
    /// Returns `ClassifierError::InvalidModel` if shapes do not line up.
    pub fn new(model: LinearModel) -> Result<Self, ClassifierError> {
        let n_classes = model.weights.len();
        if n_classes == 0 {
            return Err(ClassifierError::InvalidModel("model has no classes".into()));
        }
        if let Some(bad) = model.weights.iter().position(|w| w.len() != FEATURE_COUNT) {
            return Err(ClassifierError::InvalidModel(format!(
                "class {bad} has {} weights, expected {FEATURE_COUNT}",
                model.weights[bad].len()
            )));
        }
        if model.intercepts.len() != n_classes {
            return Err(ClassifierError::InvalidModel(format!(
                "{} intercepts for {n_classes} classes",
                model.intercepts.len()
            )));
        }

        let labels = match &model.classes {
            Some(classes) if classes.len() != n_classes => {
                return Err(ClassifierError::InvalidModel(format!(
                    "{} class labels for {n_classes} classes",
                    classes.len()
                )));
            }
            Some(classes) => classes.clone(),
            None => (0..n_classes as i64).collect(),
        };

        Ok(Self { model, labels })
    }

    /// Raw class label for one row.
    fn predict_label(&self, row: &FeatureVector) -> i64 {
        let mut best = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (class, (weights, intercept)) in self
            .model
            .weights
            .iter()
            .zip(&self.model.intercepts)
            .enumerate()
        {
            let score = intercept
                + weights
                    .iter()
                    .zip(row.values())
                    .map(|(w, x)| w * x)
                    .sum::<f64>();
            if score > best_score {
                best = class;
                best_score = score;
            }
        }
        self.labels[best]
    }
}

impl Classifier for NativeClassifier {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn predict_batch(&self, rows: &[FeatureVector]) -> Vec<Severity> {
        rows.iter()
            .map(|row| Severity::from_raw(self.predict_label(row)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Demographics, SymptomVector};

    /// Zero weights; only the intercept of `winner` is positive.
    fn bias_only(winner: usize, classes: Option<Vec<i64>>) -> LinearModel {
        let mut intercepts = vec![0.0; 4];
        intercepts[winner] = 1.0;
        LinearModel {
            weights: vec![vec![0.0; FEATURE_COUNT]; 4],
            intercepts,
            classes,
        }
    }

    fn row(flags: [bool; 6]) -> FeatureVector {
        FeatureVector::encode(&SymptomVector::from_flags(flags), &Demographics::new(30, "male"))
    }

    #[test]
    fn test_argmax_picks_class() {
        let classifier = NativeClassifier::new(bias_only(2, None)).expect("Valid model");
        assert_eq!(classifier.predict(&row([true; 6])), Severity::Moderate);
    }

    #[test]
    fn test_weights_drive_prediction() {
        // Class 3 rewards difficulty_breathing, class 0 wins otherwise.
        let mut weights = vec![vec![0.0; FEATURE_COUNT]; 4];
        weights[3][2] = 5.0;
        let model = LinearModel {
            weights,
            intercepts: vec![1.0, 0.0, 0.0, 0.0],
            classes: None,
        };
        let classifier = NativeClassifier::new(model).expect("Valid model");

        let out = classifier.predict_batch(&[
            row([false, false, true, false, false, false]),
            row([true, false, false, false, false, false]),
        ]);
        assert_eq!(out, vec![Severity::Severe, Severity::Controlled]);
    }

    #[test]
    fn test_out_of_range_labels_are_clamped() {
        let model = bias_only(1, Some(vec![0, 9, 2, -4]));
        let classifier = NativeClassifier::new(model).expect("Valid model");
        assert_eq!(classifier.predict(&row([false; 6])), Severity::Severe);

        let model = bias_only(3, Some(vec![0, 9, 2, -4]));
        let classifier = NativeClassifier::new(model).expect("Valid model");
        assert_eq!(classifier.predict(&row([false; 6])), Severity::Controlled);
    }

    #[test]
    fn test_shape_validation() {
        let mut model = bias_only(0, None);
        model.weights[1].pop();
        assert!(NativeClassifier::new(model).is_err());

        let mut model = bias_only(0, None);
        model.intercepts.pop();
        assert!(NativeClassifier::new(model).is_err());

        assert!(NativeClassifier::new(bias_only(0, Some(vec![0, 1]))).is_err());
    }
}
