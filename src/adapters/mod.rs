//! Adapters layer: Concrete implementations of ports.
//!
//! - `classifier`: loading the trained severity artifact
//! - `sqlite`: SQLite for accounts and prediction history
//! - `sessions`: in-memory session registry
//! - `sanitize`: secret filtering for logs

pub mod classifier;
pub mod sanitize;
pub mod sessions;
pub mod sqlite;

// Re-export storage error for lib.rs
pub use classifier::ClassifierError;
pub use sqlite::StorageError;
