//! S32K3x8 EVB peripheral models.
//!
//! This crate implements register-level models of the board's peripherals:
//! 1. **Devices:** UART, CAN controller and MPU, each a 4 KiB MMIO window.
//! 2. **Platform:** Interrupt lines, byte sinks, and a device registry keyed by kind.
//! 3. **SoC:** Interconnect with MPU gating, on-chip memories, and the board builder.
//! 4. **Configuration:** Board defaults with JSON overrides.

/// Common types (access types and error types).
pub mod common;
/// Board configuration (defaults, memory map, peripheral instances).
pub mod config;
/// System-on-chip (builder, bus, devices, memory, interrupts, traits).
pub mod soc;

/// Root configuration type; use `Config::default()` or load from JSON.
pub use crate::config::Config;
/// Top-level system (bus and interrupt lines); construct with `System::new`.
pub use crate::soc::System;
