//! Common types shared by the platform and the device models.
//!
//! This module provides:
//! 1. **Memory Access:** Definitions for categorizing bus operations (Read/Write).
//! 2. **Error Handling:** Protection faults and platform error types.

/// Memory access type definitions.
pub mod data;

/// Error types and fault definitions.
pub mod error;

pub use data::AccessType;
pub use error::{AccessFault, BuildError, BusError, ConfigError};
