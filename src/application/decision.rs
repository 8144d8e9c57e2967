//! Severity decision engine.
//!
//! A fixed, ordered list of override rules is evaluated first; the first
//! rule that fires decides the severity. When none fires, the inputs are
//! encoded as a feature vector and handed to the classifier.
//!
//! Several rules overlap on purpose and the list order is part of the
//! behavior. `AllSymptomsSenior`, `AllSymptomsChild` and `AllSymptoms` all
//! yield `Severe`; they stay separate entries so a future change to one of
//! them cannot silently alter the others.

use std::sync::Arc;

use crate::domain::{Demographics, FeatureVector, Gender, Severity, SymptomVector};
use crate::ports::Classifier;

/// A hard-coded condition that fixes the severity without the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideRule {
    /// No symptom reported
    NoSymptoms,
    /// Every symptom reported, age 60 or over
    AllSymptomsSenior,
    /// Every symptom reported, age under 11
    AllSymptomsChild,
    /// Every symptom reported
    AllSymptoms,
    /// No symptom reported, male, age 25 or over.
    ///
    /// Never fires: `NoSymptoms` precedes it and covers every input it
    /// matches. Kept in place until a clinical owner confirms it can go.
    AsymptomaticAdultMale,
    /// Difficulty breathing at age 50 or over
    SeniorBreathingDifficulty,
}

/// Evaluation order. First match wins.
pub const OVERRIDE_RULES: [OverrideRule; 6] = [
    OverrideRule::NoSymptoms,
    OverrideRule::AllSymptomsSenior,
    OverrideRule::AllSymptomsChild,
    OverrideRule::AllSymptoms,
    OverrideRule::AsymptomaticAdultMale,
    OverrideRule::SeniorBreathingDifficulty,
];

impl OverrideRule {
    /// Stable identifier for logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::NoSymptoms => "no_symptoms",
            Self::AllSymptomsSenior => "all_symptoms_senior",
            Self::AllSymptomsChild => "all_symptoms_child",
            Self::AllSymptoms => "all_symptoms",
            Self::AsymptomaticAdultMale => "asymptomatic_adult_male",
            Self::SeniorBreathingDifficulty => "senior_breathing_difficulty",
        }
    }

    /// The severity this rule fixes, if its condition holds.
    #[must_use]
    pub fn evaluate(self, symptoms: &SymptomVector, demographics: &Demographics) -> Option<Severity> {
        let age = demographics.age;
        let fires = match self {
            Self::NoSymptoms => !symptoms.any(),
            Self::AllSymptomsSenior => symptoms.all() && age >= 60,
            Self::AllSymptomsChild => symptoms.all() && age < 11,
            Self::AllSymptoms => symptoms.all(),
            Self::AsymptomaticAdultMale => {
                !symptoms.any() && demographics.gender_kind() == Gender::Male && age >= 25
            }
            Self::SeniorBreathingDifficulty => age >= 50 && symptoms.difficulty_breathing,
        };

        fires.then_some(match self {
            Self::NoSymptoms | Self::AsymptomaticAdultMale => Severity::Controlled,
            Self::AllSymptomsSenior
            | Self::AllSymptomsChild
            | Self::AllSymptoms
            | Self::SeniorBreathingDifficulty => Severity::Severe,
        })
    }
}

/// How a severity was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSource {
    Override(OverrideRule),
    Classifier,
    /// No classifier loaded; severity is the safe default
    ClassifierUnavailable,
}

/// Outcome of the decision procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub severity: Severity,
    pub source: DecisionSource,
}

impl Decision {
    /// True when the classifier was needed but not loaded.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.source == DecisionSource::ClassifierUnavailable
    }
}

/// Decides a severity from symptoms and demographics.
///
/// Stateless apart from the shared, read-only classifier; safe to call
/// from many threads at once.
#[derive(Clone)]
pub struct SeverityEngine {
    classifier: Option<Arc<dyn Classifier>>,
}

impl SeverityEngine {
    /// Create an engine. `None` means the classifier is unavailable.
    #[must_use]
    pub fn new(classifier: Option<Arc<dyn Classifier>>) -> Self {
        if classifier.is_none() {
            tracing::warn!("Severity engine running without a classifier (degraded mode)");
        }
        Self { classifier }
    }

    #[must_use]
    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    /// First override rule that fires, with its severity.
    #[must_use]
    pub fn first_override(
        symptoms: &SymptomVector,
        demographics: &Demographics,
    ) -> Option<(OverrideRule, Severity)> {
        OVERRIDE_RULES
            .iter()
            .find_map(|&rule| rule.evaluate(symptoms, demographics).map(|s| (rule, s)))
    }

    /// Decide the severity. Total: always returns a decision.
    #[must_use]
    pub fn decide(&self, symptoms: &SymptomVector, demographics: &Demographics) -> Decision {
        if let Some((rule, severity)) = Self::first_override(symptoms, demographics) {
            tracing::debug!("Override rule {} fired: severity={}", rule.name(), severity);
            return Decision {
                severity,
                source: DecisionSource::Override(rule),
            };
        }

        let Some(classifier) = &self.classifier else {
            tracing::warn!("No classifier loaded; defaulting to {}", Severity::Controlled);
            return Decision {
                severity: Severity::Controlled,
                source: DecisionSource::ClassifierUnavailable,
            };
        };

        let features = FeatureVector::encode(symptoms, demographics);
        let severity = classifier.predict(&features);
        tracing::debug!("Classifier {} predicted severity={}", classifier.name(), severity);

        Decision {
            severity,
            source: DecisionSource::Classifier,
        }
    }
}
