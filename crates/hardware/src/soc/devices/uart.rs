//! Transmit-only UART.
//!
//! Models the board's custom serial register file. Writing DATA emits the low byte
//! to the injected output sink, latches TX_COMPLETE and, if enabled, asserts the
//! interrupt line. There is no receive path and no framing or timing model;
//! the baud rate register is informational.
//!
//! # Registers
//!
//! * `0x10`: BAUD (read/write, informational)
//! * `0x14`: STATUS (read; any write clears TX_COMPLETE)
//! * `0x18`: CTRL (bit 1 enables the transmit-complete interrupt)
//! * `0x1C`: DATA (write transmits, read returns the last value written)

use std::fmt;

use tracing::{debug, warn};

use crate::soc::devices::{Device, LOG_GUEST_ERROR, LOG_UNIMP};
use crate::soc::irq::IrqSink;
use crate::soc::sink::ByteSink;

/// Device kind under which the UART factory is registered.
pub const KIND: &str = "s32k3x8evb_uart";

/// Baud Rate Register.
pub const REG_BAUD: u64 = 0x10;
/// Status Register.
pub const REG_STATUS: u64 = 0x14;
/// Control Register.
pub const REG_CTRL: u64 = 0x18;
/// Data Register.
pub const REG_DATA: u64 = 0x1C;

/// Status Register: transmission complete.
pub const STATUS_TX_COMPLETE: u32 = 1 << 0;

/// Control Register: transmit-complete interrupt enable.
pub const CTRL_INTERRUPT_ENABLE: u32 = 1 << 1;

/// Baud rate after reset.
pub const DEFAULT_BAUD: u32 = 115_200;

/// Size of the register window.
pub const WINDOW_SIZE: u64 = 0x1000;

/// UART device structure.
pub struct Uart {
    name: String,
    /// Base physical address of the device.
    base_addr: u64,
    baud_rate: u32,
    control: u32,
    status: u32,
    /// Last value written to DATA.
    data: u32,
    /// Mirrors `control & CTRL_INTERRUPT_ENABLE`.
    interrupt_enabled: bool,
    output: Box<dyn ByteSink>,
    irq: Box<dyn IrqSink>,
}

impl Uart {
    /// Creates a UART in its reset state.
    ///
    /// # Arguments
    ///
    /// * `name` - Instance name reported on the bus.
    /// * `base_addr` - The base physical address of the register window.
    /// * `output` - Sink receiving transmitted bytes.
    /// * `irq` - Transmit-complete interrupt output.
    pub fn new(
        name: impl Into<String>,
        base_addr: u64,
        output: Box<dyn ByteSink>,
        irq: Box<dyn IrqSink>,
    ) -> Self {
        Self {
            name: name.into(),
            base_addr,
            baud_rate: DEFAULT_BAUD,
            control: 0,
            status: STATUS_TX_COMPLETE,
            data: 0,
            interrupt_enabled: false,
            output,
            irq,
        }
    }

    /// Returns whether the transmit-complete interrupt is enabled.
    pub fn interrupt_enabled(&self) -> bool {
        self.interrupt_enabled
    }

    /// Returns the raw status register.
    pub fn status(&self) -> u32 {
        self.status
    }

    fn write_ctrl(&mut self, val: u32) {
        self.control = val;
        self.interrupt_enabled = (val & CTRL_INTERRUPT_ENABLE) != 0;
    }

    /// Transmits the low byte of `val`.
    ///
    /// Side effects happen in a fixed order: store, emit, latch TX_COMPLETE,
    /// then evaluate the interrupt.
    fn write_data(&mut self, val: u32) {
        self.data = val;
        let byte = val as u8;
        debug!(target: LOG_UNIMP, "{}: output {:?}", self.name, byte as char);
        self.output.write_byte(byte);
        self.status |= STATUS_TX_COMPLETE;
        self.tx_interrupt();
    }

    fn tx_interrupt(&self) {
        if self.interrupt_enabled && (self.status & STATUS_TX_COMPLETE) != 0 {
            self.irq.raise();
            debug!(
                target: LOG_UNIMP,
                "{}: interrupt raised (status: {:#x})", self.name, self.status
            );
        }
    }
}

impl fmt::Debug for Uart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Uart")
            .field("name", &self.name)
            .field("base_addr", &self.base_addr)
            .field("baud_rate", &self.baud_rate)
            .field("control", &self.control)
            .field("status", &self.status)
            .field("data", &self.data)
            .field("interrupt_enabled", &self.interrupt_enabled)
            .finish_non_exhaustive()
    }
}

impl Device for Uart {
    fn name(&self) -> &str {
        &self.name
    }

    fn address_range(&self) -> (u64, u64) {
        (self.base_addr, WINDOW_SIZE)
    }

    fn read_u32(&mut self, offset: u64) -> u32 {
        match offset {
            REG_BAUD => self.baud_rate,
            REG_CTRL => self.control,
            REG_STATUS => {
                debug!(target: LOG_UNIMP, "{}: STATUS read: {:#x}", self.name, self.status);
                self.status
            }
            REG_DATA => self.data,
            _ => {
                warn!(target: LOG_GUEST_ERROR, "{}: invalid read at offset {:#x}", self.name, offset);
                0
            }
        }
    }

    fn write_u32(&mut self, offset: u64, val: u32) {
        debug!(target: LOG_UNIMP, "{}: write offset={:#x} val={:#x}", self.name, offset, val);
        match offset {
            REG_BAUD => self.baud_rate = val,
            REG_CTRL => self.write_ctrl(val),
            REG_DATA => self.write_data(val),
            // Write-to-clear: the written value is ignored.
            REG_STATUS => self.status &= !STATUS_TX_COMPLETE,
            _ => {
                warn!(target: LOG_GUEST_ERROR, "{}: invalid write at offset {:#x}", self.name, offset);
            }
        }
    }
}
