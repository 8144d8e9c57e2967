//! Asthma severity grades.
//!
//! Severity is an integer grade 0..=3. Every conversion from a raw integer
//! clamps into that range, so no out-of-range value survives past the
//! boundary where it was produced.

use serde::{Deserialize, Serialize};

/// Severity grade of the reported asthma condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", from = "i64")]
pub enum Severity {
    /// Symptoms under control
    Controlled = 0,
    /// Mild symptoms, home care
    Mild = 1,
    /// Moderate symptoms, home care
    Moderate = 2,
    /// Severe symptoms, seek medical attention
    Severe = 3,
}

impl Severity {
    /// All grades in ascending order.
    pub const ALL: [Severity; 4] = [
        Self::Controlled,
        Self::Mild,
        Self::Moderate,
        Self::Severe,
    ];

    /// Convert a raw integer grade, clamping to 0..=3.
    #[must_use]
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            i64::MIN..=0 => Self::Controlled,
            1 => Self::Mild,
            2 => Self::Moderate,
            _ => Self::Severe,
        }
    }

    /// Integer grade.
    #[must_use]
    pub fn level(self) -> u8 {
        self as u8
    }

    /// One grade higher, saturating at `Severe`.
    #[must_use]
    pub fn escalate(self) -> Self {
        Self::from_raw(i64::from(self.level()) + 1)
    }
}

impl From<i64> for Severity {
    fn from(raw: i64) -> Self {
        Self::from_raw(raw)
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        severity.level()
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Controlled => write!(f, "CONTROLLED"),
            Self::Mild => write!(f, "MILD"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::Severe => write!(f, "SEVERE"),
        }
    }
}
