//! System interconnect (bus) for memory and MMIO access.
//!
//! This module implements the bus that routes physical address accesses to devices. It provides:
//! 1. **Device registration:** Devices are added by address window, rejected on overlap, and sorted for lookup.
//! 2. **Access routing:** Read/write by address with a last-device hint, passing window-relative offsets.
//! 3. **Protection:** While an MPU is attached and enabled, every access outside the MPU's own window
//!    is checked against its regions first, at both its first and last byte; denied reads return 0
//!    and denied writes are dropped.
//! 4. **Load:** Binary loading into memories for tests and platform bring-up.

use tracing::{debug, warn};

use crate::common::{AccessType, BuildError, BusError};
use crate::soc::devices::{Device, LOG_GUEST_ERROR, Mpu};

/// System bus; routes accesses by physical address.
pub struct Bus {
    /// Registered devices, sorted by base address.
    devices: Vec<Box<dyn Device>>,
    last_device_idx: usize,
    mpu_idx: Option<usize>,
    /// When false the MPU is never consulted for other devices' windows.
    enforce_mpu: bool,
}

impl Bus {
    /// Creates an empty bus.
    ///
    /// # Arguments
    ///
    /// * `enforce_mpu` - Whether an attached MPU gates accesses to other devices.
    pub fn new(enforce_mpu: bool) -> Self {
        Self {
            devices: Vec::new(),
            last_device_idx: 0,
            mpu_idx: None,
            enforce_mpu,
        }
    }

    /// Registers a device on the bus.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::EmptyWindow`] for a zero-sized window and
    /// [`BuildError::Overlap`] if the window intersects an existing device.
    pub fn add_device(&mut self, dev: Box<dyn Device>) -> Result<(), BuildError> {
        let (base, size) = dev.address_range();
        if size == 0 {
            return Err(BuildError::EmptyWindow(dev.name().to_owned()));
        }
        let end = base.saturating_add(size);
        if let Some(other) = self.devices.iter().find(|d| {
            let (start, len) = d.address_range();
            base < start.saturating_add(len) && start < end
        }) {
            return Err(BuildError::Overlap {
                name: dev.name().to_owned(),
                base,
                size,
                other: other.name().to_owned(),
            });
        }

        self.devices.push(dev);
        self.devices.sort_by_key(|d| d.address_range().0);
        self.mpu_idx = self
            .devices
            .iter_mut()
            .position(|d| d.as_mpu_mut().is_some());
        self.last_device_idx = 0;
        Ok(())
    }

    /// Returns `(name, base, size)` for every device in address order.
    pub fn memory_map(&self) -> Vec<(String, u64, u64)> {
        self.devices
            .iter()
            .map(|d| {
                let (base, size) = d.address_range();
                (d.name().to_owned(), base, size)
            })
            .collect()
    }

    /// Returns whether the MPU gates accesses to other devices.
    pub fn enforces_mpu(&self) -> bool {
        self.enforce_mpu
    }

    /// Returns the attached MPU, if any.
    pub fn mpu_mut(&mut self) -> Option<&mut Mpu> {
        let idx = self.mpu_idx?;
        self.devices[idx].as_mpu_mut()
    }

    /// Returns the device registered under `name`.
    pub fn device_mut(&mut self, name: &str) -> Option<&mut Box<dyn Device>> {
        self.devices.iter_mut().find(|d| d.name() == name)
    }

    /// Returns whether the given physical address is backed by any device.
    pub fn is_valid_address(&self, paddr: u64) -> bool {
        self.devices.iter().any(|dev| {
            let (start, size) = dev.address_range();
            paddr >= start && paddr - start < size
        })
    }

    /// Writes a binary blob into memory at the given physical address.
    ///
    /// If one device claims the whole range, writes via that device; otherwise falls back to
    /// byte-by-byte writes. Loading is platform bring-up and bypasses the MPU.
    pub fn load_binary_at(&mut self, data: &[u8], addr: u64) {
        if let Some((idx, offset)) = self.find_device(addr) {
            let dev = &mut self.devices[idx];
            let (_, size) = dev.address_range();
            if offset
                .checked_add(data.len() as u64)
                .is_some_and(|end| end <= size)
            {
                dev.write_bytes(offset, data);
                return;
            }
        }
        for (i, byte) in data.iter().enumerate() {
            // Bytes past the top of the address space are dropped.
            let Some(paddr) = addr.checked_add(i as u64) else {
                break;
            };
            if let Some((idx, offset)) = self.find_device(paddr) {
                self.devices[idx].write_u8(offset, *byte);
            }
        }
    }

    fn find_device(&mut self, paddr: u64) -> Option<(usize, u64)> {
        if let Some(dev) = self.devices.get(self.last_device_idx) {
            let (start, size) = dev.address_range();
            if paddr >= start && paddr - start < size {
                return Some((self.last_device_idx, paddr - start));
            }
        }

        for (i, dev) in self.devices.iter().enumerate() {
            let (start, size) = dev.address_range();
            if paddr >= start && paddr - start < size {
                self.last_device_idx = i;
                return Some((i, paddr - start));
            }
        }
        None
    }

    /// Consults the MPU for a `width`-byte access landing on device `idx`.
    ///
    /// Regions are larger than any access, so checking the first and last
    /// byte covers every region the access touches.
    fn gate(
        &mut self,
        idx: usize,
        paddr: u64,
        width: u64,
        access: AccessType,
    ) -> Result<(), BusError> {
        if !self.enforce_mpu || self.mpu_idx == Some(idx) {
            return Ok(());
        }
        let Some(mpu) = self.mpu_mut().filter(|mpu| mpu.is_enabled()) else {
            return Ok(());
        };
        let required = access.required_permission();
        let last = paddr.saturating_add(width.saturating_sub(1));
        for addr in [paddr, last] {
            // A 32-bit MPU cannot describe addresses above 4 GiB.
            if let Ok(address) = u32::try_from(addr) {
                mpu.check_access(address, required)?;
            }
            if last == paddr {
                break;
            }
        }
        Ok(())
    }

    fn access<T>(
        &mut self,
        paddr: u64,
        width: u64,
        access: AccessType,
        op: impl FnOnce(&mut dyn Device, u64) -> T,
    ) -> Result<T, BusError> {
        let (idx, offset) = self.find_device(paddr).ok_or(BusError::Unmapped(paddr))?;
        self.gate(idx, paddr, width, access)?;
        Ok(op(self.devices[idx].as_mut(), offset))
    }

    fn report(err: BusError) {
        match err {
            BusError::Unmapped(_) => warn!(target: LOG_GUEST_ERROR, "{err}"),
            // The MPU already logged the violation.
            BusError::Protection(_) => debug!("{err}"),
        }
    }

    /// Reads four bytes at the given physical address.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Unmapped`] if no device claims the address and
    /// [`BusError::Protection`] if the MPU denies the read.
    pub fn checked_read_u32(&mut self, paddr: u64) -> Result<u32, BusError> {
        self.access(paddr, 4, AccessType::Read, |dev, offset| dev.read_u32(offset))
    }

    /// Writes four bytes at the given physical address.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Unmapped`] if no device claims the address and
    /// [`BusError::Protection`] if the MPU denies the write.
    pub fn checked_write_u32(&mut self, paddr: u64, val: u32) -> Result<(), BusError> {
        self.access(paddr, 4, AccessType::Write, |dev, offset| {
            dev.write_u32(offset, val);
        })
    }

    /// Reads one byte at the given physical address; returns 0 if unmapped or denied.
    pub fn read_u8(&mut self, paddr: u64) -> u8 {
        self.access(paddr, 1, AccessType::Read, |dev, offset| dev.read_u8(offset))
            .unwrap_or_else(|err| {
                Self::report(err);
                0
            })
    }
    /// Reads two bytes (little-endian) at the given physical address; returns 0 if unmapped or denied.
    pub fn read_u16(&mut self, paddr: u64) -> u16 {
        self.access(paddr, 2, AccessType::Read, |dev, offset| dev.read_u16(offset))
            .unwrap_or_else(|err| {
                Self::report(err);
                0
            })
    }
    /// Reads four bytes (little-endian) at the given physical address; returns 0 if unmapped or denied.
    pub fn read_u32(&mut self, paddr: u64) -> u32 {
        self.checked_read_u32(paddr).unwrap_or_else(|err| {
            Self::report(err);
            0
        })
    }
    /// Writes one byte at the given physical address; no-op if unmapped or denied.
    pub fn write_u8(&mut self, paddr: u64, val: u8) {
        let result = self.access(paddr, 1, AccessType::Write, |dev, offset| {
            dev.write_u8(offset, val);
        });
        if let Err(err) = result {
            Self::report(err);
        }
    }
    /// Writes two bytes (little-endian) at the given physical address; no-op if unmapped or denied.
    pub fn write_u16(&mut self, paddr: u64, val: u16) {
        let result = self.access(paddr, 2, AccessType::Write, |dev, offset| {
            dev.write_u16(offset, val);
        });
        if let Err(err) = result {
            Self::report(err);
        }
    }
    /// Writes four bytes (little-endian) at the given physical address; no-op if unmapped or denied.
    pub fn write_u32(&mut self, paddr: u64, val: u32) {
        if let Err(err) = self.checked_write_u32(paddr, val) {
            Self::report(err);
        }
    }
}

impl std::fmt::Debug for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bus")
            .field("devices", &self.memory_map())
            .field("mpu_idx", &self.mpu_idx)
            .field("enforce_mpu", &self.enforce_mpu)
            .finish_non_exhaustive()
    }
}
