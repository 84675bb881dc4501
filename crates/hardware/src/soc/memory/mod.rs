//! On-chip memories.
//!
//! Flash, tightly-coupled memories and SRAM banks are all modeled the same way:
//! a zero-initialized byte array mapped at a physical base address with
//! little-endian multi-byte access. No timing or wait states are modeled.

use crate::soc::devices::Device;

/// A RAM or flash region.
#[derive(Debug)]
pub struct Memory {
    name: String,
    /// The base physical address where this memory is mapped.
    base_addr: u64,
    data: Vec<u8>,
}

impl Memory {
    /// Creates a zero-filled memory region.
    ///
    /// # Arguments
    ///
    /// * `name` - Region name (e.g., `"SRAM0"`).
    /// * `base_addr` - Starting physical address.
    /// * `size` - Size in bytes.
    pub fn new(name: impl Into<String>, base_addr: u64, size: usize) -> Self {
        Self {
            name: name.into(),
            base_addr,
            data: vec![0; size],
        }
    }

    /// Loads a byte slice into memory at a specific offset.
    ///
    /// Writes that would run past the end of the region are ignored.
    ///
    /// # Arguments
    ///
    /// * `data` - The data to write.
    /// * `offset` - The byte offset relative to the memory base address.
    pub fn load(&mut self, data: &[u8], offset: usize) {
        if let Some(dst) = offset
            .checked_add(data.len())
            .and_then(|end| self.data.get_mut(offset..end))
        {
            dst.copy_from_slice(data);
        }
    }

    /// Returns the region contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    fn read_array<const N: usize>(&self, offset: u64) -> [u8; N] {
        let start = offset as usize;
        start
            .checked_add(N)
            .and_then(|end| self.data.get(start..end))
            .and_then(|s| s.try_into().ok())
            .unwrap_or([0; N])
    }
}

impl Device for Memory {
    fn name(&self) -> &str {
        &self.name
    }

    fn address_range(&self) -> (u64, u64) {
        (self.base_addr, self.data.len() as u64)
    }

    fn read_u8(&mut self, offset: u64) -> u8 {
        self.data.get(offset as usize).copied().unwrap_or(0)
    }

    /// Reads a half-word (little-endian).
    fn read_u16(&mut self, offset: u64) -> u16 {
        u16::from_le_bytes(self.read_array(offset))
    }

    /// Reads a word (little-endian).
    fn read_u32(&mut self, offset: u64) -> u32 {
        u32::from_le_bytes(self.read_array(offset))
    }

    fn write_u8(&mut self, offset: u64, val: u8) {
        if let Some(byte) = self.data.get_mut(offset as usize) {
            *byte = val;
        }
    }

    fn write_u16(&mut self, offset: u64, val: u16) {
        self.load(&val.to_le_bytes(), offset as usize);
    }

    fn write_u32(&mut self, offset: u64, val: u32) {
        self.load(&val.to_le_bytes(), offset as usize);
    }

    fn write_bytes(&mut self, offset: u64, data: &[u8]) {
        self.load(data, offset as usize);
    }

    fn as_memory_mut(&mut self) -> Option<&mut Memory> {
        Some(self)
    }
}
