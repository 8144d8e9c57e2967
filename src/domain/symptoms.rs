//! Reported symptoms and demographics.
//!
//! Requests arrive as loosely-typed JSON. Normalization into the typed
//! values below never fails: missing symptom fields read as absent, and an
//! age that cannot be read as an integer becomes 0.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of tracked symptoms.
pub const SYMPTOM_COUNT: usize = 6;

/// Symptom field names in feature-vector order.
pub const SYMPTOM_NAMES: [&str; SYMPTOM_COUNT] = [
    "tiredness",
    "dry_cough",
    "difficulty_breathing",
    "sore_throat",
    "nasal_congestion",
    "runny_nose",
];

/// The six reported symptom flags.
///
/// Field order is fixed: it defines positions 0..=5 of the feature vector.
/// Serialized as an array of six 0/1 integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "[u8; 6]", from = "[u8; 6]")]
pub struct SymptomVector {
    pub tiredness: bool,
    pub dry_cough: bool,
    pub difficulty_breathing: bool,
    pub sore_throat: bool,
    pub nasal_congestion: bool,
    pub runny_nose: bool,
}

impl SymptomVector {
    /// Build from flags in feature-vector order.
    #[must_use]
    pub fn from_flags(flags: [bool; SYMPTOM_COUNT]) -> Self {
        Self {
            tiredness: flags[0],
            dry_cough: flags[1],
            difficulty_breathing: flags[2],
            sore_throat: flags[3],
            nasal_congestion: flags[4],
            runny_nose: flags[5],
        }
    }

    /// Every symptom reported.
    #[must_use]
    pub fn all_present() -> Self {
        Self::from_flags([true; SYMPTOM_COUNT])
    }

    /// Flags in feature-vector order.
    #[must_use]
    pub fn flags(&self) -> [bool; SYMPTOM_COUNT] {
        [
            self.tiredness,
            self.dry_cough,
            self.difficulty_breathing,
            self.sore_throat,
            self.nasal_congestion,
            self.runny_nose,
        ]
    }

    /// Number of reported symptoms.
    #[must_use]
    pub fn count(&self) -> usize {
        self.flags().iter().filter(|&&f| f).count()
    }

    /// True when every symptom is reported.
    #[must_use]
    pub fn all(&self) -> bool {
        self.flags().iter().all(|&f| f)
    }

    /// True when at least one symptom is reported.
    #[must_use]
    pub fn any(&self) -> bool {
        self.flags().iter().any(|&f| f)
    }

    /// Read the flags from a JSON object.
    ///
    /// Missing fields are false. Non-boolean values follow JSON truthiness
    /// (see [`truthy`]).
    #[must_use]
    pub fn from_json(body: &Value) -> Self {
        let mut flags = [false; SYMPTOM_COUNT];
        for (flag, name) in flags.iter_mut().zip(SYMPTOM_NAMES) {
            *flag = body.get(name).is_some_and(truthy);
        }
        Self::from_flags(flags)
    }
}

impl From<SymptomVector> for [u8; SYMPTOM_COUNT] {
    fn from(symptoms: SymptomVector) -> Self {
        symptoms.flags().map(u8::from)
    }
}

impl From<[u8; SYMPTOM_COUNT]> for SymptomVector {
    fn from(raw: [u8; SYMPTOM_COUNT]) -> Self {
        Self::from_flags(raw.map(|v| v != 0))
    }
}

/// Recognized gender values. Matching is exact and case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Female,
    Male,
    /// Anything other than exactly "female" or "male"
    Unrecognized,
}

impl Gender {
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        match raw {
            "female" => Self::Female,
            "male" => Self::Male,
            _ => Self::Unrecognized,
        }
    }
}

/// Age and gender as reported.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Demographics {
    /// Age in years
    pub age: u32,
    /// Gender exactly as submitted
    pub gender: String,
}

impl Demographics {
    #[must_use]
    pub fn new(age: u32, gender: impl Into<String>) -> Self {
        Self {
            age,
            gender: gender.into(),
        }
    }

    #[must_use]
    pub fn gender_kind(&self) -> Gender {
        Gender::classify(&self.gender)
    }

    /// Read age and gender from a JSON object.
    #[must_use]
    pub fn from_json(body: &Value) -> Self {
        let age = body.get("age").map_or(0, normalize_age);
        let gender = body
            .get("gender")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self { age, gender }
    }
}

/// A complete normalized assessment input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SymptomReport {
    pub symptoms: SymptomVector,
    pub demographics: Demographics,
}

impl SymptomReport {
    #[must_use]
    pub fn new(symptoms: SymptomVector, demographics: Demographics) -> Self {
        Self {
            symptoms,
            demographics,
        }
    }

    /// Normalize a raw JSON request body.
    #[must_use]
    pub fn from_json(body: &Value) -> Self {
        Self {
            symptoms: SymptomVector::from_json(body),
            demographics: Demographics::from_json(body),
        }
    }
}

/// JSON truthiness: null, false, zero, and empty strings, arrays and
/// objects are false; everything else is true.
#[must_use]
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Normalize a submitted age.
///
/// Integers are taken as-is, floats truncate toward zero, strings are parsed
/// as integers after trimming, booleans count as 1/0. Anything unreadable
/// and any negative value becomes 0.
#[must_use]
pub fn normalize_age(value: &Value) -> u32 {
    let raw: i64 = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<i64>().unwrap_or(0),
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    };
    u32::try_from(raw.max(0)).unwrap_or(u32::MAX)
}
