//! Fault and error definitions.
//!
//! This module defines the error types surfaced by the platform. It provides:
//! 1. **Protection Faults:** Raised when the MPU denies an access.
//! 2. **Bus Errors:** Unmapped addresses and protection faults seen by bus accessors.
//! 3. **Build Errors:** Problems assembling a board from configuration.
//! 4. **Config Errors:** Failures reading or parsing a configuration document.
//!
//! Register accesses made by a device model never fail; guest programming
//! errors are logged and degrade to a read of zero or an ignored write.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// An access denied by the Memory Protection Unit.
///
/// The MPU has already recorded the fault into its `EAR`/`EDR` registers by the
/// time this value is returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("MPU fault at {address:#010x}: required permission {required:#x} not granted")]
pub struct AccessFault {
    /// The faulting address as presented to the protection check.
    pub address: u32,
    /// Permission mask the access required.
    pub required: u32,
    /// Detail code written into `EDR`.
    pub detail: u32,
}

/// Errors reported by the checked bus accessors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum BusError {
    /// No device window contains the address.
    #[error("no device mapped at {0:#x}")]
    Unmapped(u64),

    /// The MPU denied the access.
    #[error(transparent)]
    Protection(#[from] AccessFault),
}

/// Errors raised while assembling a system from configuration.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The configuration names a device kind the registry has no factory for.
    #[error("unknown device kind `{0}`")]
    UnknownDevice(String),

    /// A factory was registered twice under the same kind.
    #[error("device kind `{0}` is already registered")]
    DuplicateKind(String),

    /// Two devices claim overlapping address windows.
    #[error("`{name}` at {base:#x}+{size:#x} overlaps `{other}`")]
    Overlap {
        /// Device being added.
        name: String,
        /// Its base address.
        base: u64,
        /// Its window size.
        size: u64,
        /// Device already occupying part of the window.
        other: String,
    },

    /// A device or memory region declares an empty window.
    #[error("`{0}` has an empty address window")]
    EmptyWindow(String),

    /// A peripheral is wired to an interrupt line the controller does not have.
    #[error("`{name}` requests IRQ {irq} but only {lines} lines exist")]
    IrqOutOfRange {
        /// Peripheral instance name.
        name: String,
        /// Requested line.
        irq: u32,
        /// Number of lines the controller provides.
        lines: usize,
    },
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The document is not valid configuration JSON.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
