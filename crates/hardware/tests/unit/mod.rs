//! # Unit Components
//!
//! Tests grouped by the crate module they exercise.
