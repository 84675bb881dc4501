//! Memory Access Types.
//!
//! This module defines the classification of bus accesses used by the platform.
//! These types are used for the following:
//! 1. **Permission Validation:** Mapping an access to the MPU permission bits it requires.
//! 2. **Fault Reporting:** Naming the access kind in protection faults and logs.

use std::fmt;

use crate::soc::devices::mpu::{READ_ONLY, READ_WRITE};

/// Type of bus access operation.
///
/// Distinguishes loads from stores for permission enforcement. Instruction
/// fetches are not modeled since no core executes on this platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessType {
    /// Data read access.
    ///
    /// Satisfied by a region granting either the read-only or the read/write bit.
    Read,

    /// Data write access.
    ///
    /// Satisfied only by a region granting the read/write bit.
    Write,
}

impl AccessType {
    /// Returns the MPU permission mask this access requires.
    ///
    /// A region permits the access when `attr & mask != 0`.
    #[inline]
    pub const fn required_permission(self) -> u32 {
        match self {
            Self::Read => READ_ONLY | READ_WRITE,
            Self::Write => READ_WRITE,
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "READ"),
            Self::Write => write!(f, "WRITE"),
        }
    }
}
