//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the assessment logic and its collaborators (classifier artifact,
//! storage, sessions, time).

mod classifier;
mod clock;
mod sessions;
mod storage;

pub use classifier::Classifier;
pub use clock::{Clock, SystemClock};
pub use sessions::SessionStore;
pub use storage::{PredictionPage, Storage};
