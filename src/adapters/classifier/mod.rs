//! Classifier adapter: loads the trained artifact behind the `Classifier` port.
//!
//! The artifact is a JSON document:
//! - a top-level array is a bulk table, wrapped by [`TableClassifier`]
//!   (textual when its first entry is a string, numeric otherwise);
//! - a top-level object with `"kind": "linear"` is an exported model with
//!   its own prediction, wrapped by [`NativeClassifier`].
//!
//! The variant is chosen once here. Anything else is a load failure, and
//! callers get no classifier at all (see [`load_or_unavailable`]).
//!
//! # Integrity
//!
//! When an expected SHA-256 digest is configured, the artifact bytes must
//! match it before they are parsed.

mod native;
mod table;

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

pub use native::{LinearModel, NativeClassifier};
pub use table::{TableClassifier, TableKind};

use crate::ports::Classifier;

/// Errors while loading a classifier artifact.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Failed to read artifact {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Artifact is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Artifact digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("Artifact table is empty")]
    EmptyTable,

    #[error("Artifact exposes neither a table nor a prediction capability: {0}")]
    Unsupported(String),

    #[error("Invalid model parameters: {0}")]
    InvalidModel(String),
}

fn sha256_hex_bytes(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn constant_time_eq_str(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes().iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Check artifact bytes against an expected hex digest.
///
/// # Errors
/// Returns `ClassifierError::DigestMismatch` on mismatch.
pub fn verify_digest(bytes: &[u8], expected_sha256: &str) -> Result<(), ClassifierError> {
    let expected = expected_sha256.trim().to_ascii_lowercase();
    let actual = sha256_hex_bytes(bytes);
    if constant_time_eq_str(&expected, &actual) {
        Ok(())
    } else {
        Err(ClassifierError::DigestMismatch { expected, actual })
    }
}

/// Build a classifier from artifact bytes.
///
/// # Errors
/// Returns error if the bytes are not JSON or describe no usable artifact.
pub fn classifier_from_json(bytes: &[u8]) -> Result<Arc<dyn Classifier>, ClassifierError> {
    let artifact: Value = serde_json::from_slice(bytes)?;

    match &artifact {
        Value::Array(entries) => {
            let kind = match entries.first() {
                None => return Err(ClassifierError::EmptyTable),
                Some(Value::String(_)) => TableKind::Textual,
                Some(_) => TableKind::Numeric,
            };
            tracing::debug!("Table artifact: {} entries, {:?}", entries.len(), kind);
            Ok(Arc::new(TableClassifier::new(kind)))
        }
        Value::Object(fields) => match fields.get("kind").and_then(Value::as_str) {
            Some("linear") => {
                let model = LinearModel::deserialize(&artifact)?;
                Ok(Arc::new(NativeClassifier::new(model)?))
            }
            Some(other) => Err(ClassifierError::Unsupported(format!("unknown model kind {other:?}"))),
            None => Err(ClassifierError::Unsupported("object without a model kind".into())),
        },
        other => Err(ClassifierError::Unsupported(format!(
            "top-level {} value",
            json_type_name(other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Load a classifier artifact from disk.
///
/// # Errors
/// Returns error if the file cannot be read, fails the digest check, or
/// describes no usable artifact.
pub fn load_classifier(
    path: &Path,
    expected_sha256: Option<&str>,
) -> Result<Arc<dyn Classifier>, ClassifierError> {
    let bytes = std::fs::read(path).map_err(|source| ClassifierError::Read {
        path: path.display().to_string(),
        source,
    })?;

    if let Some(expected) = expected_sha256 {
        verify_digest(&bytes, expected)?;
    } else {
        tracing::debug!("No artifact digest configured; skipping integrity check");
    }

    let classifier = classifier_from_json(&bytes)?;
    tracing::info!(
        "Loaded classifier artifact from {:?} ({})",
        path,
        classifier.name()
    );
    Ok(classifier)
}

/// Load a classifier, or report it unavailable.
///
/// Load failures are logged and turned into `None`; requests then run in
/// degraded mode instead of failing.
#[must_use]
pub fn load_or_unavailable(
    path: &Path,
    expected_sha256: Option<&str>,
) -> Option<Arc<dyn Classifier>> {
    match load_classifier(path, expected_sha256) {
        Ok(classifier) => Some(classifier),
        Err(e) => {
            tracing::error!("Classifier unavailable: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Demographics, FeatureVector, Severity, SymptomVector, FEATURE_COUNT};
    use tempfile::tempdir;

    fn two_symptoms(age: u32) -> FeatureVector {
        FeatureVector::encode(
            &SymptomVector::from_flags([true, true, false, false, false, false]),
            &Demographics::new(age, "male"),
        )
    }

    #[test]
    fn test_numeric_table() {
        let classifier = classifier_from_json(b"[0.1, 0.2, 0.3]").expect("Should load");
        assert_eq!(classifier.name(), "table");
        assert_eq!(classifier.predict(&two_symptoms(30)), Severity::Moderate);
        assert_eq!(classifier.predict(&two_symptoms(60)), Severity::Severe);
    }

    #[test]
    fn test_textual_table() {
        let classifier = classifier_from_json(br#"["Mild", "Severe"]"#).expect("Should load");
        let rows = vec![two_symptoms(70); 5];
        assert_eq!(classifier.predict_batch(&rows), vec![Severity::Controlled; 5]);
    }

    #[test]
    fn test_only_first_entry_decides_table_kind() {
        let classifier = classifier_from_json(br#"[[1, 0], "text"]"#).expect("Should load");
        assert_eq!(classifier.name(), "table");
    }

    #[test]
    fn test_linear_model() {
        let mut weights = vec![vec![0.0; FEATURE_COUNT]; 2];
        weights[1][0] = 2.0;
        let artifact = serde_json::json!({
            "kind": "linear",
            "weights": weights,
            "intercepts": [1.0, 0.0],
            "classes": [0, 3],
        });
        let bytes = serde_json::to_vec(&artifact).expect("serialize artifact");
        let classifier = classifier_from_json(&bytes).expect("Should load");
        assert_eq!(classifier.name(), "linear");
        assert_eq!(classifier.predict(&two_symptoms(30)), Severity::Severe);
    }

    #[test]
    fn test_unusable_artifacts() {
        assert!(matches!(classifier_from_json(b"[]"), Err(ClassifierError::EmptyTable)));
        assert!(matches!(
            classifier_from_json(br#"{"coefficients": [1, 2]}"#),
            Err(ClassifierError::Unsupported(_))
        ));
        assert!(matches!(
            classifier_from_json(br#"{"kind": "forest"}"#),
            Err(ClassifierError::Unsupported(_))
        ));
        assert!(matches!(classifier_from_json(b"42"), Err(ClassifierError::Unsupported(_))));
        assert!(matches!(classifier_from_json(b"not json"), Err(ClassifierError::Parse(_))));
    }

    #[test]
    fn test_load_from_disk_with_digest() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("trained_model.json");
        let bytes = b"[1, 2, 3]";
        std::fs::write(&path, bytes).expect("write artifact");

        let digest = sha256_hex_bytes(bytes);
        assert!(load_classifier(&path, Some(&digest)).is_ok());
        assert!(load_classifier(&path, Some(&digest.to_uppercase())).is_ok());
        assert!(matches!(
            load_classifier(&path, Some(&"0".repeat(64))),
            Err(ClassifierError::DigestMismatch { .. })
        ));
    }

    #[test]
    fn test_missing_artifact_is_unavailable() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("absent.json");
        assert!(matches!(load_classifier(&path, None), Err(ClassifierError::Read { .. })));
        assert!(load_or_unavailable(&path, None).is_none());
    }

    #[test]
    fn test_bundled_artifact_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("models/trained_model.json");
        let classifier = load_or_unavailable(&path, None).expect("Bundled artifact should load");
        assert_eq!(classifier.predict(&two_symptoms(30)), Severity::Moderate);
    }
}
