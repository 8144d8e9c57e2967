//! # AsthmaCare
//!
//! Asthma severity assessment service.
//!
//! This crate provides:
//! - Severity grading from self-reported symptoms and demographics
//! - Guidance text and resources per severity grade
//! - Accounts, sessions and per-user prediction history
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (symptoms, severity, records, credentials)
//! - `ports`: Trait definitions for external operations
//! - `adapters`: Concrete implementations (classifier artifacts, SQLite, sessions)
//! - `application`: Use cases orchestrating domain and ports
//! - `api`: Request routing and status-coded responses
//! - `config`: Environment configuration

pub mod adapters;
pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use domain::{Recommendation, Severity, SymptomReport};

/// Result type for AsthmaCare operations
pub type Result<T> = std::result::Result<T, AsthmaCareError>;

/// Main error type for AsthmaCare
#[derive(Debug, thiserror::Error)]
pub enum AsthmaCareError {
    #[error("Storage operation failed: {0}")]
    Storage(#[from] adapters::StorageError),

    #[error("Classifier unavailable: {0}")]
    Classifier(#[from] adapters::ClassifierError),

    #[error("Credential operation failed: {0}")]
    Credential(#[from] domain::CredentialError),

    #[error("Passwords do not match!")]
    PasswordMismatch,

    #[error("Username already exists!")]
    UsernameTaken,

    #[error("Invalid credentials!")]
    InvalidCredentials,

    #[error("User not authenticated")]
    AuthenticationRequired,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Session could not be opened")]
    SessionUnavailable,

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AsthmaCareError {
    /// HTTP-style status code for this error.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::PasswordMismatch | Self::UsernameTaken | Self::Validation(_) => 400,
            Self::InvalidCredentials | Self::AuthenticationRequired => 401,
            Self::Unauthorized => 403,
            Self::Storage(_)
            | Self::SessionUnavailable
            | Self::Classifier(_)
            | Self::Credential(_)
            | Self::Io(_)
            | Self::Serialization(_) => 500,
        }
    }

    /// True for failures the caller caused.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AsthmaCareError::PasswordMismatch.status(), 400);
        assert_eq!(AsthmaCareError::UsernameTaken.status(), 400);
        assert_eq!(AsthmaCareError::InvalidCredentials.status(), 401);
        assert_eq!(AsthmaCareError::AuthenticationRequired.status(), 401);
        assert_eq!(AsthmaCareError::Unauthorized.status(), 403);
        assert_eq!(AsthmaCareError::SessionUnavailable.status(), 500);
        assert_eq!(
            AsthmaCareError::Storage(adapters::StorageError::Serialization("x".into())).status(),
            500
        );
    }

    #[test]
    fn test_messages_match_client_contract() {
        assert_eq!(AsthmaCareError::PasswordMismatch.to_string(), "Passwords do not match!");
        assert_eq!(AsthmaCareError::UsernameTaken.to_string(), "Username already exists!");
        assert_eq!(AsthmaCareError::InvalidCredentials.to_string(), "Invalid credentials!");
        assert_eq!(AsthmaCareError::AuthenticationRequired.to_string(), "User not authenticated");
        assert!(!AsthmaCareError::Io(std::io::Error::other("disk")).is_client_error());
    }
}
