//! Classifier feature encoding.
//!
//! Layout (15 values):
//! - 0..=5: symptom flags
//! - 6..=10: age buckets (<=9, 10-19, 20-24, 25-59, >=60), exactly one set
//! - 11, 12: gender female, male, at most one set
//! - 13, 14: severity-mild / severity-moderate placeholders, always 0

use serde::{Deserialize, Serialize};

use super::symptoms::{Demographics, Gender, SymptomVector, SYMPTOM_COUNT};

/// Length of a feature vector.
pub const FEATURE_COUNT: usize = 15;

/// Position of the first age bucket.
pub const AGE_BUCKET_OFFSET: usize = SYMPTOM_COUNT;

/// Position of the "age >= 60" indicator.
pub const SENIOR_INDEX: usize = 10;

/// Position of the female indicator; male follows it.
pub const GENDER_OFFSET: usize = 11;

/// Age bucket of the encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBucket {
    Child,
    Teen,
    YoungAdult,
    Adult,
    Senior,
}

impl AgeBucket {
    /// Buckets partition all non-negative ages.
    #[must_use]
    pub fn of(age: u32) -> Self {
        match age {
            0..=9 => Self::Child,
            10..=19 => Self::Teen,
            20..=24 => Self::YoungAdult,
            25..=59 => Self::Adult,
            _ => Self::Senior,
        }
    }

    /// Offset of this bucket within the age block.
    #[must_use]
    pub fn position(self) -> usize {
        match self {
            Self::Child => 0,
            Self::Teen => 1,
            Self::YoungAdult => 2,
            Self::Adult => 3,
            Self::Senior => 4,
        }
    }
}

/// Fixed-order numeric encoding consumed by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Encode symptoms and demographics.
    #[must_use]
    pub fn encode(symptoms: &SymptomVector, demographics: &Demographics) -> Self {
        let mut values = [0.0; FEATURE_COUNT];

        for (slot, flag) in values.iter_mut().zip(symptoms.flags()) {
            *slot = if flag { 1.0 } else { 0.0 };
        }

        values[AGE_BUCKET_OFFSET + AgeBucket::of(demographics.age).position()] = 1.0;

        match demographics.gender_kind() {
            Gender::Female => values[GENDER_OFFSET] = 1.0,
            Gender::Male => values[GENDER_OFFSET + 1] = 1.0,
            Gender::Unrecognized => {}
        }

        Self(values)
    }

    /// Create from raw values.
    ///
    /// # Errors
    /// Returns error if the slice length is not 15.
    pub fn from_slice(v: &[f64]) -> Result<Self, String> {
        let values: [f64; FEATURE_COUNT] = v
            .try_into()
            .map_err(|_| format!("Expected {FEATURE_COUNT} features, got {}", v.len()))?;
        Ok(Self(values))
    }

    #[must_use]
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    /// The six symptom positions.
    #[must_use]
    pub fn symptom_values(&self) -> &[f64] {
        &self.0[..SYMPTOM_COUNT]
    }

    /// Whether the "age >= 60" indicator is set.
    #[must_use]
    pub fn is_senior(&self) -> bool {
        self.0[SENIOR_INDEX] == 1.0
    }
}
