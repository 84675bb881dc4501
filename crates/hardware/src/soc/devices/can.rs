//! Single-mailbox CAN controller.
//!
//! A register-level stand-in for the FlexCAN block: one transmit buffer, one
//! receive buffer and an optional loopback that mirrors transmitted words into
//! the receive buffer. No bit timing, arbitration or framing is modeled.
//!
//! # Registers
//!
//! * `0x00`: MCR (Module Configuration, stored verbatim)
//! * `0x04`: CTRL (bit 2 enables loopback)
//! * `0x08`: STATUS (bit 0 TX_READY, always reported set; bit 1 RX_READY)
//! * `0x10`: TXBUF (write transmits)
//! * `0x14`: RXBUF (writable so software can pre-load it)
//! * `0x18`: IRQ (read-only)

use std::fmt;

use tracing::{debug, warn};

use crate::soc::devices::{Device, LOG_GUEST_ERROR, LOG_UNIMP};
use crate::soc::irq::IrqSink;

/// Device kind under which the CAN factory is registered.
pub const KIND: &str = "s32k3x8evb_can";

/// Module Configuration Register.
pub const REG_MCR: u64 = 0x00;
/// Control Register.
pub const REG_CTRL: u64 = 0x04;
/// Status Register.
pub const REG_STATUS: u64 = 0x08;
/// Transmit Buffer.
pub const REG_TXBUF: u64 = 0x10;
/// Receive Buffer.
pub const REG_RXBUF: u64 = 0x14;
/// Interrupt Register.
pub const REG_IRQ: u64 = 0x18;

/// Status Register: transmit buffer available.
pub const STATUS_TX_READY: u32 = 1 << 0;
/// Status Register: receive buffer holds data.
pub const STATUS_RX_READY: u32 = 1 << 1;
/// Control Register: loopback mode.
pub const CTRL_LOOPBACK: u32 = 1 << 2;

/// Size of the register window.
pub const WINDOW_SIZE: u64 = 0x1000;

/// CAN controller device structure.
pub struct Can {
    name: String,
    /// Base physical address of the device.
    base_addr: u64,
    mcr: u32,
    ctrl: u32,
    status: u32,
    tx_buf: u32,
    rx_buf: u32,
    irq_reg: u32,
    irq: Box<dyn IrqSink>,
}

impl Can {
    /// Creates a CAN controller in its reset state (TX_READY set).
    ///
    /// # Arguments
    ///
    /// * `name` - Instance name reported on the bus.
    /// * `base_addr` - The base physical address of the register window.
    /// * `irq` - Controller interrupt output.
    pub fn new(name: impl Into<String>, base_addr: u64, irq: Box<dyn IrqSink>) -> Self {
        Self {
            name: name.into(),
            base_addr,
            mcr: 0,
            ctrl: 0,
            status: STATUS_TX_READY,
            tx_buf: 0,
            rx_buf: 0,
            irq_reg: 0,
            irq,
        }
    }

    /// Returns whether loopback mode is enabled in CTRL.
    pub fn loopback_enabled(&self) -> bool {
        (self.ctrl & CTRL_LOOPBACK) != 0
    }

    /// Returns the stored status register, without the forced TX_READY bit.
    pub fn raw_status(&self) -> u32 {
        self.status
    }

    fn transmit(&mut self, val: u32) {
        self.tx_buf = val;
        self.status |= STATUS_TX_READY;
        debug!(target: LOG_UNIMP, "{}: TX_READY set, status {:#010x}", self.name, self.status);

        if self.loopback_enabled() {
            self.rx_buf = val;
            self.status |= STATUS_RX_READY;
            debug!(target: LOG_UNIMP, "{}: loopback RXBUF = {:#010x}", self.name, self.rx_buf);
        }

        self.irq.raise();
    }
}

impl fmt::Debug for Can {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Can")
            .field("name", &self.name)
            .field("base_addr", &self.base_addr)
            .field("mcr", &self.mcr)
            .field("ctrl", &self.ctrl)
            .field("status", &self.status)
            .field("tx_buf", &self.tx_buf)
            .field("rx_buf", &self.rx_buf)
            .field("irq_reg", &self.irq_reg)
            .finish_non_exhaustive()
    }
}

impl Device for Can {
    fn name(&self) -> &str {
        &self.name
    }

    fn address_range(&self) -> (u64, u64) {
        (self.base_addr, WINDOW_SIZE)
    }

    fn read_u32(&mut self, offset: u64) -> u32 {
        match offset {
            REG_MCR => self.mcr,
            REG_CTRL => self.ctrl,
            REG_STATUS => {
                debug!(target: LOG_UNIMP, "{}: STATUS read: {:#010x}", self.name, self.status);
                self.status | STATUS_TX_READY
            }
            REG_TXBUF => self.tx_buf,
            REG_RXBUF => self.rx_buf,
            REG_IRQ => self.irq_reg,
            _ => {
                warn!(target: LOG_GUEST_ERROR, "{}: invalid read at offset {:#x}", self.name, offset);
                0
            }
        }
    }

    fn write_u32(&mut self, offset: u64, val: u32) {
        debug!(target: LOG_UNIMP, "{}: write {:#010x} to offset {:#x}", self.name, val, offset);
        match offset {
            REG_MCR => self.mcr = val,
            REG_CTRL => self.ctrl = val,
            // Hardware owns these flags; the model lets software overwrite them.
            REG_STATUS => self.status = val,
            REG_TXBUF => self.transmit(val),
            REG_RXBUF => self.rx_buf = val,
            _ => {
                warn!(target: LOG_GUEST_ERROR, "{}: invalid write at offset {:#x}", self.name, offset);
            }
        }
    }
}
