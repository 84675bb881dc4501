//! System-on-Chip (SoC) Components.
//!
//! This module organizes the components that make up the simulated board,
//! including the system bus, on-chip memories, peripherals, interrupt lines,
//! and the builder for assembling the system.

/// System builder for assembling SoC components.
pub mod builder;

/// Memory-mapped I/O device implementations.
pub mod devices;

/// System bus interconnect and routing.
pub mod interconnect;

/// Interrupt lines and the interrupt sink capability.
pub mod irq;

/// Flash, TCM and SRAM models.
pub mod memory;

/// Factory map from device kind to constructor.
pub mod registry;

/// Byte sinks for character output.
pub mod sink;

/// Device trait definitions for MMIO access.
pub mod traits;

pub use builder::{System, SystemBuilder};
