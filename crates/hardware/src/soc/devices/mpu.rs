//! Memory Protection Unit (MPU).
//!
//! Holds two protection regions, each a fixed 4 KiB window with a 4-bit
//! permission mask, and answers permission queries for any address. The bus
//! consults it before dispatching accesses to other devices; the MPU gates reads
//! of its own non-configuration offsets itself.
//!
//! Matching rules:
//! - A region matches when `base <= addr < base + 0x1000`.
//! - A matching region denies the access unless `attr & required != 0`.
//! - Unconfigured regions (base 0, attr 0) still match `[0, 0x1000)`, so low
//!   addresses are denied until software moves or opens those regions.
//!
//! # Registers
//!
//! * `0x00`: CESR (Control/Error Status; bit 0 enable, cannot be cleared)
//! * `0x10`: EAR (Error Address)
//! * `0x14`: EDR (Error Detail)
//! * `0x20`/`0x24`: Region 0 base / attributes
//! * `0x30`/`0x34`: Region 1 base / attributes

use std::fmt;

use tracing::{debug, warn};

use crate::common::error::AccessFault;
use crate::soc::devices::{Device, LOG_GUEST_ERROR, LOG_UNIMP};
use crate::soc::irq::IrqSink;

/// Device kind under which the MPU factory is registered.
pub const KIND: &str = "s32k3x8evb_mpu";

/// Control/Error Status Register.
pub const REG_CESR: u64 = 0x00;
/// Error Address Register.
pub const REG_EAR: u64 = 0x10;
/// Error Detail Register.
pub const REG_EDR: u64 = 0x14;
/// Region 0 Base Address Register.
pub const REG_REGION0_RBAR: u64 = 0x20;
/// Region 0 Attribute Register.
pub const REG_REGION0_RASR: u64 = 0x24;
/// Region 1 Base Address Register.
pub const REG_REGION1_RBAR: u64 = 0x30;
/// Region 1 Attribute Register.
pub const REG_REGION1_RASR: u64 = 0x34;

/// Number of protection regions.
pub const MAX_REGIONS: usize = 2;

/// Size of every protection region in bytes.
pub const REGION_SIZE: u32 = 0x1000;

/// CESR: protection enabled.
pub const CESR_ENABLE: u32 = 1 << 0;

/// Region attribute: no access.
pub const NO_ACCESS: u32 = 0x0;
/// Region attribute: reads allowed.
pub const READ_ONLY: u32 = 0x1;
/// Region attribute: reads and writes allowed.
pub const READ_WRITE: u32 = 0x2;
/// Region attribute: execute never.
pub const EXECUTE_NEVER: u32 = 0x4;

/// Value written into EDR when an access is denied.
pub const FAULT_DETAIL: u32 = 0xDEAD;

/// Size of the register window.
pub const WINDOW_SIZE: u64 = 0x1000;

/// Region bases are 16-byte aligned.
const RBAR_MASK: u32 = 0xFFFF_FFF0;
/// Only the permission nibble of an attribute register is kept.
const RASR_MASK: u32 = 0xF;

/// One protection region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MpuRegion {
    /// 16-byte aligned base address.
    pub base: u32,
    /// Permission bits (`READ_ONLY`, `READ_WRITE`, `EXECUTE_NEVER`).
    pub attr: u32,
}

impl MpuRegion {
    /// Returns true if `address` falls inside this region's window.
    pub fn contains(&self, address: u32) -> bool {
        address >= self.base && address - self.base < REGION_SIZE
    }

    /// Returns true if the region grants any bit of `required`.
    pub fn permits(&self, required: u32) -> bool {
        self.attr & required != 0
    }
}

/// Decoded configuration register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ConfigReg {
    Cesr,
    Ear,
    Edr,
    Base(usize),
    Attr(usize),
}

impl ConfigReg {
    fn decode(offset: u64) -> Option<Self> {
        match offset {
            REG_CESR => Some(Self::Cesr),
            REG_EAR => Some(Self::Ear),
            REG_EDR => Some(Self::Edr),
            REG_REGION0_RBAR => Some(Self::Base(0)),
            REG_REGION0_RASR => Some(Self::Attr(0)),
            REG_REGION1_RBAR => Some(Self::Base(1)),
            REG_REGION1_RASR => Some(Self::Attr(1)),
            _ => None,
        }
    }
}

/// Memory Protection Unit device structure.
pub struct Mpu {
    name: String,
    /// Base physical address of the device.
    base_addr: u64,
    cesr: u32,
    ear: u32,
    edr: u32,
    regions: [MpuRegion; MAX_REGIONS],
    /// Fault interrupt output; wired but never driven.
    #[allow(dead_code)]
    irq: Box<dyn IrqSink>,
}

impl Mpu {
    /// Creates an MPU in its reset state: enabled, both regions cleared.
    ///
    /// # Arguments
    ///
    /// * `name` - Instance name reported on the bus.
    /// * `base_addr` - The base physical address of the register window.
    /// * `irq` - Fault interrupt output (reserved).
    pub fn new(name: impl Into<String>, base_addr: u64, irq: Box<dyn IrqSink>) -> Self {
        Self {
            name: name.into(),
            base_addr,
            cesr: CESR_ENABLE,
            ear: 0,
            edr: 0,
            regions: [MpuRegion::default(); MAX_REGIONS],
            irq,
        }
    }

    /// Returns true when CESR has the enable bit set.
    pub fn is_enabled(&self) -> bool {
        self.cesr & CESR_ENABLE != 0
    }

    /// Returns the Control/Error Status Register.
    pub fn cesr(&self) -> u32 {
        self.cesr
    }

    /// Returns the last faulting address.
    pub fn ear(&self) -> u32 {
        self.ear
    }

    /// Returns the last fault detail code.
    pub fn edr(&self) -> u32 {
        self.edr
    }

    /// Returns the protection regions in index order.
    pub fn regions(&self) -> &[MpuRegion] {
        &self.regions
    }

    /// Returns whether an access needing `required` is allowed at `address`.
    ///
    /// Every matching region must grant at least one bit of `required`.
    /// Addresses outside all regions are allowed.
    pub fn is_access_allowed(&self, address: u32, required: u32) -> bool {
        self.regions
            .iter()
            .filter(|region| region.contains(address))
            .all(|region| region.permits(required))
    }

    /// Checks an access and records a fault into EAR/EDR on denial.
    ///
    /// # Errors
    ///
    /// Returns [`AccessFault`] when a matching region does not grant `required`.
    pub fn check_access(&mut self, address: u32, required: u32) -> Result<(), AccessFault> {
        if self.is_access_allowed(address, required) {
            return Ok(());
        }
        self.ear = address;
        self.edr = FAULT_DETAIL;
        warn!(
            target: LOG_GUEST_ERROR,
            "{}: MPU fault, unauthorized access (required {:#x}) at {:#010x}",
            self.name, required, address
        );
        Err(AccessFault {
            address,
            required,
            detail: FAULT_DETAIL,
        })
    }

    fn read_config(&self, reg: ConfigReg) -> u32 {
        match reg {
            ConfigReg::Cesr => self.cesr,
            ConfigReg::Ear => self.ear,
            ConfigReg::Edr => self.edr,
            ConfigReg::Base(i) => self.regions[i].base,
            ConfigReg::Attr(i) => self.regions[i].attr,
        }
    }

    fn write_config(&mut self, reg: ConfigReg, val: u32) {
        match reg {
            ConfigReg::Cesr => {
                self.cesr = val | CESR_ENABLE;
                debug!(target: LOG_UNIMP, "{}: enabled, CESR={:#010x}", self.name, self.cesr);
            }
            ConfigReg::Ear => {
                self.ear = val;
                debug!(target: LOG_UNIMP, "{}: EAR set to {:#010x}", self.name, self.ear);
            }
            ConfigReg::Edr => {
                self.edr = val;
                debug!(target: LOG_UNIMP, "{}: EDR set to {:#010x}", self.name, self.edr);
            }
            ConfigReg::Base(i) => {
                self.regions[i].base = val & RBAR_MASK;
                debug!(
                    target: LOG_UNIMP,
                    "{}: region {} base set to {:#010x}", self.name, i, self.regions[i].base
                );
            }
            ConfigReg::Attr(i) => {
                self.regions[i].attr = val & RASR_MASK;
                debug!(
                    target: LOG_UNIMP,
                    "{}: region {} attributes set to {:#x}", self.name, i, self.regions[i].attr
                );
            }
        }
    }
}

impl fmt::Debug for Mpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mpu")
            .field("name", &self.name)
            .field("base_addr", &self.base_addr)
            .field("cesr", &self.cesr)
            .field("ear", &self.ear)
            .field("edr", &self.edr)
            .field("regions", &self.regions)
            .finish_non_exhaustive()
    }
}

impl Device for Mpu {
    fn name(&self) -> &str {
        &self.name
    }

    fn address_range(&self) -> (u64, u64) {
        (self.base_addr, WINDOW_SIZE)
    }

    /// Configuration registers are never gated; any other offset is checked
    /// against the regions for read permission first.
    fn read_u32(&mut self, offset: u64) -> u32 {
        if let Some(reg) = ConfigReg::decode(offset) {
            return self.read_config(reg);
        }
        if self.check_access(offset as u32, READ_ONLY).is_err() {
            return 0;
        }
        warn!(target: LOG_GUEST_ERROR, "{}: invalid read at offset {:#x}", self.name, offset);
        0
    }

    fn write_u32(&mut self, offset: u64, val: u32) {
        match ConfigReg::decode(offset) {
            Some(reg) => self.write_config(reg, val),
            None => {
                warn!(
                    target: LOG_GUEST_ERROR,
                    "{}: MPU fault, unauthorized write at {:#010x}", self.name, offset
                );
            }
        }
    }

    fn as_mpu_mut(&mut self) -> Option<&mut Mpu> {
        Some(self)
    }
}
