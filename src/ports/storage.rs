//! Storage port: Trait for persistent storage operations.
//!
//! This trait abstracts the storage backend (SQLite) from the application logic.
//! Predictions are append-only: nothing updates a stored record.

use crate::domain::{PredictionRecord, UserAccount};

/// A page of prediction records with pagination metadata.
#[derive(Debug, Clone)]
pub struct PredictionPage {
    /// Records in this page
    pub items: Vec<PredictionRecord>,
    /// Total count of matching records
    pub total_count: usize,
    /// Current page offset
    pub offset: usize,
    /// Page size limit
    pub limit: usize,
    /// Whether there are more pages
    pub has_more: bool,
}

impl PredictionPage {
    /// Create a new prediction page.
    #[must_use]
    pub fn new(items: Vec<PredictionRecord>, total_count: usize, offset: usize, limit: usize) -> Self {
        let has_more = offset.saturating_add(items.len()) < total_count;
        Self {
            items,
            total_count,
            offset,
            limit,
            has_more,
        }
    }

    /// Get the next page offset.
    #[must_use]
    pub fn next_offset(&self) -> Option<usize> {
        self.has_more.then_some(self.offset.saturating_add(self.limit))
    }
}

/// Trait for persistent storage of accounts and predictions.
pub trait Storage: Send + Sync {
    /// Error type for storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Register a user.
    ///
    /// # Returns
    /// `false` if the username is already taken.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn create_user(&self, username: &str, password_hash: &str) -> Result<bool, Self::Error>;

    /// Look up a user by name.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn find_user(&self, username: &str) -> Result<Option<UserAccount>, Self::Error>;

    /// Append a prediction record.
    ///
    /// # Returns
    /// The id assigned to the stored record.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn insert_prediction(&self, record: &PredictionRecord) -> Result<i64, Self::Error>;

    /// Load every complete record owned by `owner`, oldest first.
    ///
    /// Rows missing severity, symptoms or timestamp are skipped.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn load_predictions_for_owner(&self, owner: &str) -> Result<Vec<PredictionRecord>, Self::Error>;

    /// Load complete records owned by `owner` with pagination.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn load_predictions_for_owner_paginated(
        &self,
        owner: &str,
        offset: usize,
        limit: usize,
    ) -> Result<PredictionPage, Self::Error>;

    /// Count all stored prediction rows.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn count_predictions(&self) -> Result<usize, Self::Error>;

    /// Delete rows missing severity, symptoms or timestamp.
    ///
    /// # Returns
    /// Number of rows removed.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn purge_incomplete_predictions(&self) -> Result<usize, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_at_extreme_offset() {
        let page = PredictionPage::new(Vec::new(), 3, usize::MAX, usize::MAX);
        assert!(!page.has_more);
        assert_eq!(page.next_offset(), None);
    }

    #[test]
    fn test_next_offset() {
        let page = PredictionPage::new(Vec::new(), 10, 0, 4);
        assert!(page.has_more);
        assert_eq!(page.next_offset(), Some(4));
    }
}
