//! Device trait for memory-mapped I/O.
//!
//! This module defines the `Device` trait implemented by all bus-attached components. It provides:
//! 1. **Identification:** `name` and `address_range` for bus routing.
//! 2. **Access:** 32-bit register read/write at window-relative offsets, with byte and
//!    half-word accessors derived from them.
//! 3. **Downcasting:** Optional casts to `Mpu` or `Memory` for platform-specific access.
//!
//! All implementors must be `Send + Sync` so a board can be moved across threads.

use crate::soc::devices::Mpu;
use crate::soc::memory::Memory;

/// Trait for memory-mapped devices attached to the system bus.
///
/// Peripheral register files decode 32-bit registers and ignore the access width,
/// so the narrow accessors default to widening the value on writes and truncating
/// it on reads. Memory overrides them with true byte-granular access.
pub trait Device: Send + Sync {
    /// Returns the instance name (e.g., `"UART0"`, `"SRAM0"`).
    fn name(&self) -> &str;
    /// Returns (base_address, size_in_bytes) for this device's window.
    fn address_range(&self) -> (u64, u64);
    /// Reads the 32-bit register at the given window-relative offset.
    fn read_u32(&mut self, offset: u64) -> u32;
    /// Writes the 32-bit register at the given window-relative offset.
    fn write_u32(&mut self, offset: u64, val: u32);

    /// Reads one byte at the given offset (default: low byte of `read_u32`).
    fn read_u8(&mut self, offset: u64) -> u8 {
        self.read_u32(offset) as u8
    }
    /// Reads two bytes at the given offset (default: low half of `read_u32`).
    fn read_u16(&mut self, offset: u64) -> u16 {
        self.read_u32(offset) as u16
    }
    /// Writes one byte at the given offset (default: zero-extended `write_u32`).
    fn write_u8(&mut self, offset: u64, val: u8) {
        self.write_u32(offset, val as u32);
    }
    /// Writes two bytes at the given offset (default: zero-extended `write_u32`).
    fn write_u16(&mut self, offset: u64, val: u16) {
        self.write_u32(offset, val as u32);
    }

    /// Writes a contiguous byte slice at the given offset (default: byte-by-byte).
    fn write_bytes(&mut self, offset: u64, data: &[u8]) {
        for (i, byte) in data.iter().enumerate() {
            let Some(off) = offset.checked_add(i as u64) else {
                break;
            };
            self.write_u8(off, *byte);
        }
    }

    /// Returns a mutable reference as `Mpu` if this device is the protection unit; otherwise `None`.
    fn as_mpu_mut(&mut self) -> Option<&mut Mpu> {
        None
    }
    /// Returns a mutable reference as `Memory` if this device is RAM or flash; otherwise `None`.
    fn as_memory_mut(&mut self) -> Option<&mut Memory> {
        None
    }
}
