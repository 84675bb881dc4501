//! Memory-Mapped Peripheral Devices.
//!
//! Register-level models of the board's peripherals: the transmit-only UART,
//! the single-mailbox CAN controller and the Memory Protection Unit. Each is a
//! leaf component with a fixed decode table and no data dependency on the others.

/// Single-mailbox CAN controller with loopback.
pub mod can;

/// Memory Protection Unit (protection regions and permission checks).
pub mod mpu;

/// Transmit-only UART with interrupt-on-complete.
pub mod uart;

pub use can::Can;
pub use mpu::{Mpu, MpuRegion};
pub use uart::Uart;

pub use crate::soc::traits::Device;

/// Log target for guest programming errors (invalid offsets, protection faults).
pub(crate) const LOG_GUEST_ERROR: &str = "guest_error";

/// Log target for register traffic with no hardware-equivalent effect.
pub(crate) const LOG_UNIMP: &str = "unimp";
